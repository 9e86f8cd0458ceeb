//! Form model: assembly, population, editing and array items.

pub mod array;
pub mod assembler;
pub mod control;

pub use assembler::{assemble, build, patch_entity, populate};
pub use control::{ArrayControl, Control, FormError, FormModel, ItemGroup};
