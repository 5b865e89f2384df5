mod garden_service;

pub use garden_service::GardenService;
