mod catalog_dto;

pub use catalog_dto::{
    CreateCategoryRequest, CreateServiceRequest, SearchServicesQuery, UpdateCategoryRequest,
    UpdateServiceRequest,
};
