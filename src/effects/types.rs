use serde::{Deserialize, Serialize};

/// User-facing parameter definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    pub id: u32,
    pub name: String,
    pub min: f32,
    pub max: f32,
    pub default: f32,
    pub unit: ParameterUnit,
}

impl Parameter {
    pub fn new(
        id: u32,
        name: impl Into<String>,
        min: f32,
        max: f32,
        default: f32,
        unit: ParameterUnit,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            min,
            max,
            default,
            unit,
        }
    }
}

/// Units for parameter values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterUnit {
    Generic,
    Decibels,     // dB
    Milliseconds, // ms
    Percent,      // 0-100
}
