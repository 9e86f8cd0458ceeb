//! Adding and removing items of array fields.
//!
//! Items are positional: removing item `i` shifts every later item down by
//! one, and errors reported for those items follow their new index.

use tracing::debug;

use super::control::{ArrayControl, FormError, FormModel, ItemGroup};

impl ArrayControl {
    /// Append an empty item at the tail and return its index.
    pub fn add_item(&mut self) -> usize {
        let item = ItemGroup::new(self.sub_fields(), None);
        self.items.push(item);
        self.reshaped = true;
        self.items.len() - 1
    }

    /// Remove item `index`. Returns `None` when out of range.
    pub fn remove_item(&mut self, index: usize) -> Option<ItemGroup> {
        if index >= self.items.len() {
            return None;
        }
        self.reshaped = true;
        Some(self.items.remove(index))
    }
}

impl FormModel {
    /// Append an empty item to array `array`, returning its index.
    ///
    /// Required sub-fields of the new item start out failing `required`.
    pub fn add_item(&mut self, array: &str) -> Result<usize, FormError> {
        let control = self
            .arrays
            .get_mut(array)
            .ok_or_else(|| FormError::UnknownArray(array.to_string()))?;
        let index = control.add_item();
        debug!("added item {} to {}", index, array);
        self.refresh_form_errors();
        Ok(index)
    }

    /// Remove item `index` from array `array`.
    ///
    /// Returns `Ok(false)` without touching anything when `index` is out of
    /// range.
    pub fn remove_item(&mut self, array: &str, index: usize) -> Result<bool, FormError> {
        let control = self
            .arrays
            .get_mut(array)
            .ok_or_else(|| FormError::UnknownArray(array.to_string()))?;
        if control.remove_item(index).is_none() {
            return Ok(false);
        }
        debug!("removed item {} from {}", index, array);
        self.refresh_form_errors();
        Ok(true)
    }
}
