/// UI layer: egui panels and chart rendering, no data logic.

pub mod charts;
pub mod overview;
pub mod panels;
