pub mod constants;
pub mod enums;
pub mod etag;
pub mod geo_masking;
pub mod geojson;
pub mod slug;
#[cfg(test)]
pub mod test_helpers;
pub mod types;
pub mod validation;
