//! Built-in schemas for every element type.

use super::descriptor::{FieldDescriptor, Validator};
use super::registry::TypeSchema;
use super::rules::{Capacity, FormRule, PortTerm};
use crate::entity::ElementType;

/// Paths of the fields every element carries.
pub const COMMON_FIELDS: [&str; 4] = ["name", "code", "description", "status"];

/// Lifecycle states offered by the `status` field.
pub const STATUSES: &[&str] = &["active", "inactive", "planned", "maintenance", "decommissioned"];

const IPV4: &str = r"^(\d{1,3}\.){3}\d{1,3}$";

/// Descriptors for the common fields, in display order.
pub fn common_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::text("name", "Name")
            .required()
            .with(Validator::MaxLength { value: 120 }),
        FieldDescriptor::text("code", "Code").with(Validator::MaxLength { value: 32 }),
        FieldDescriptor::text("description", "Description")
            .with(Validator::MaxLength { value: 500 }),
        FieldDescriptor::select("status", "Status", STATUSES).required(),
    ]
}

/// Built-in schema for `element_type`.
pub fn schema(element_type: ElementType) -> TypeSchema {
    let (fields, rules) = match element_type {
        ElementType::Olt => olt(),
        ElementType::Ont => ont(),
        ElementType::Splitter => splitter(),
        ElementType::Rack => rack(),
        ElementType::Cable => cable(),
        ElementType::SpliceClosure => splice_closure(),
    };
    TypeSchema::from_parts(Some(element_type), fields, rules)
}

fn olt() -> (Vec<FieldDescriptor>, Vec<FormRule>) {
    let fields = vec![
        FieldDescriptor::text("metadata.vendor", "Vendor").required(),
        FieldDescriptor::text("metadata.model", "Model").required(),
        FieldDescriptor::text("metadata.ipAddress", "Management IP")
            .with(Validator::Pattern { regex: IPV4.to_string() }),
        FieldDescriptor::count("metadata.totalPorts", "Total ports", 1.0).required(),
        FieldDescriptor::count("metadata.uplinkPorts", "Uplink ports", 0.0),
        FieldDescriptor::number("metadata.optical.txPower", "Transmit power (dBm)"),
        FieldDescriptor::number("metadata.optical.rxSensitivity", "Receive sensitivity (dBm)"),
        FieldDescriptor::array(
            "metadata.cards",
            "Line cards",
            vec![
                FieldDescriptor::count("slot", "Slot", 0.0).required(),
                FieldDescriptor::text("model", "Model").required(),
                FieldDescriptor::count("ports", "PON ports", 0.0),
            ],
        ),
    ];
    let rules = vec![
        FormRule::PortBudget {
            total: "metadata.totalPorts".to_string(),
            parts: vec![
                PortTerm::Field { path: "metadata.uplinkPorts".to_string() },
                PortTerm::ItemSum {
                    array: "metadata.cards".to_string(),
                    field: "ports".to_string(),
                },
            ],
        },
        FormRule::PowerOrdering {
            transmit: "metadata.optical.txPower".to_string(),
            receive: "metadata.optical.rxSensitivity".to_string(),
        },
    ];
    (fields, rules)
}

fn ont() -> (Vec<FieldDescriptor>, Vec<FormRule>) {
    let fields = vec![
        FieldDescriptor::text("metadata.serialNumber", "Serial number")
            .required()
            .with(Validator::Pattern { regex: r"^[A-Za-z0-9]{8,16}$".to_string() }),
        FieldDescriptor::text("metadata.oltId", "Parent OLT").required(),
        FieldDescriptor::count("metadata.ponPort", "PON port", 0.0),
        FieldDescriptor::number("metadata.bandwidth.downstreamCapacity", "Downstream (Mbps)")
            .with(Validator::Min { value: 0.0 }),
        FieldDescriptor::number("metadata.bandwidth.upstreamCapacity", "Upstream (Mbps)")
            .with(Validator::Min { value: 0.0 }),
        FieldDescriptor::number("metadata.optical.txPower", "Transmit power (dBm)"),
        FieldDescriptor::number("metadata.optical.rxPower", "Receive power (dBm)"),
    ];
    let rules = vec![FormRule::PowerOrdering {
        transmit: "metadata.optical.txPower".to_string(),
        receive: "metadata.optical.rxPower".to_string(),
    }];
    (fields, rules)
}

fn splitter() -> (Vec<FieldDescriptor>, Vec<FormRule>) {
    let fields = vec![
        FieldDescriptor::select(
            "metadata.splitRatio",
            "Split ratio",
            &["1:2", "1:4", "1:8", "1:16", "1:32", "1:64"],
        )
        .required(),
        FieldDescriptor::count("metadata.outputPorts", "Output ports", 1.0).required(),
        FieldDescriptor::count("metadata.inputPorts", "Input ports", 1.0),
        FieldDescriptor::number("metadata.insertionLoss", "Insertion loss (dB)")
            .with(Validator::Min { value: 0.0 }),
    ];
    let rules = vec![FormRule::RatioConsistency {
        ratio: "metadata.splitRatio".to_string(),
        outputs: "metadata.outputPorts".to_string(),
    }];
    (fields, rules)
}

fn rack() -> (Vec<FieldDescriptor>, Vec<FormRule>) {
    let fields = vec![
        FieldDescriptor::text("metadata.location", "Location"),
        FieldDescriptor::count("metadata.totalPorts", "Port capacity", 0.0),
        FieldDescriptor::count("metadata.usedPorts", "Used ports", 0.0),
        FieldDescriptor::count("metadata.rackUnits.total", "Rack units", 1.0),
        FieldDescriptor::count("metadata.rackUnits.used", "Used rack units", 0.0),
        FieldDescriptor::count("metadata.maxRackUnits", "Physical height (U)", 1.0),
        FieldDescriptor::array(
            "metadata.equipment",
            "Mounted equipment",
            vec![
                FieldDescriptor::text("name", "Name").required(),
                FieldDescriptor::count("position", "Position (U)", 1.0).required(),
                FieldDescriptor::count("height", "Height (U)", 1.0),
            ],
        ),
    ];
    let rules = vec![
        FormRule::CapacityVsUsed {
            used: "metadata.usedPorts".to_string(),
            total: "metadata.totalPorts".to_string(),
            resource: Capacity::Ports,
        },
        FormRule::CapacityVsUsed {
            used: "metadata.rackUnits.used".to_string(),
            total: "metadata.rackUnits.total".to_string(),
            resource: Capacity::RackUnits,
        },
        FormRule::HeightCeiling {
            total: "metadata.rackUnits.total".to_string(),
            ceiling: "metadata.maxRackUnits".to_string(),
        },
    ];
    (fields, rules)
}

fn cable() -> (Vec<FieldDescriptor>, Vec<FormRule>) {
    let fields = vec![
        FieldDescriptor::text("metadata.sourceId", "Source element").required(),
        FieldDescriptor::text("metadata.targetId", "Target element").required(),
        FieldDescriptor::select(
            "metadata.cableType",
            "Cable type",
            &["drop", "distribution", "feeder", "trunk"],
        ),
        FieldDescriptor::count("metadata.fiberCount", "Fiber count", 1.0),
        FieldDescriptor::number("metadata.lengthMeters", "Length (m)")
            .with(Validator::Min { value: 0.0 }),
        FieldDescriptor::array(
            "metadata.fibers",
            "Fibers",
            vec![
                FieldDescriptor::count("number", "Fiber #", 1.0).required(),
                FieldDescriptor::select(
                    "color",
                    "Color",
                    &[
                        "blue", "orange", "green", "brown", "slate", "white", "red", "black",
                        "yellow", "violet", "rose", "aqua",
                    ],
                ),
                FieldDescriptor::select(
                    "status",
                    "Status",
                    &["free", "used", "reserved", "damaged"],
                ),
            ],
        ),
    ];
    let rules = vec![FormRule::DistinctReferences {
        source: "metadata.sourceId".to_string(),
        target: "metadata.targetId".to_string(),
    }];
    (fields, rules)
}

fn splice_closure() -> (Vec<FieldDescriptor>, Vec<FormRule>) {
    let fields = vec![
        FieldDescriptor::text("metadata.location", "Location").required(),
        FieldDescriptor::count("metadata.capacity", "Splice capacity", 1.0),
        FieldDescriptor::multiselect(
            "metadata.tags",
            "Installation",
            &["aerial", "underground", "indoor", "outdoor"],
        ),
        FieldDescriptor::checkbox("metadata.sealed", "Sealed"),
        FieldDescriptor::array(
            "metadata.splices",
            "Splices",
            vec![
                FieldDescriptor::text("inFiber", "Incoming fiber").required(),
                FieldDescriptor::text("outFiber", "Outgoing fiber").required(),
                FieldDescriptor::number("loss", "Loss (dB)").with(Validator::Min { value: 0.0 }),
            ],
        ),
    ];
    (fields, Vec::new())
}
