// Route handlers, grouped by endpoint family.

pub mod combine;
pub mod predict;
