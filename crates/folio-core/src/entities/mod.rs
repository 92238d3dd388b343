//! Domain entities - documents stored per visitor and per design tier

mod appeal;
mod design;
mod visitor;

pub use appeal::Appeal;
pub use design::{
    BanPageDesign, CardStyle, DesignAnimation, DesignChange, DesignContent, DesignIcons,
    DesignLayout, DesignTheme, EntranceStyle,
};
pub use visitor::{DeviceInfo, LocationInfo, VisitorRecord, VisitorStatus};
