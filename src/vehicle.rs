use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Vehicle categories the tracker reports. Everything else the detector
/// sees (people, traffic lights, ...) is not a vehicle and never reaches us.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum VehicleClass {
    Car,
    Motorcycle,
    Bus,
    Truck,
}

/// BGR triple, the channel order video frames are drawn in.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub const RED: Color = Color(0, 0, 255);
}

impl VehicleClass {
    pub const ALL: [VehicleClass; 4] = [
        VehicleClass::Car,
        VehicleClass::Motorcycle,
        VehicleClass::Bus,
        VehicleClass::Truck,
    ];

    /// COCO: 2=car, 3=motorcycle, 5=bus, 7=truck
    pub fn from_coco_id(id: u32) -> Option<Self> {
        match id {
            2 => Some(VehicleClass::Car),
            3 => Some(VehicleClass::Motorcycle),
            5 => Some(VehicleClass::Bus),
            7 => Some(VehicleClass::Truck),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            VehicleClass::Car => "car",
            VehicleClass::Motorcycle => "motorcycle",
            VehicleClass::Bus => "bus",
            VehicleClass::Truck => "truck",
        }
    }

    #[inline]
    pub fn color(&self) -> Color {
        match self {
            VehicleClass::Car => Color(0, 255, 0),
            VehicleClass::Bus => Color(0, 0, 255),
            VehicleClass::Truck => Color(255, 0, 0),
            VehicleClass::Motorcycle => Color(255, 255, 0),
        }
    }
}

impl fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VehicleClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VehicleClass::ALL
            .iter()
            .copied()
            .find(|c| c.name() == s.trim())
            .ok_or_else(|| format!("unknown vehicle class {:?}", s))
    }
}
