//! Indonesian administrative regions (wilayah) reference tables.
//!
//! Read-only lookups used to place a Taman Kehati and the origin of a plant
//! collection. Codes follow the Kemendagri numbering.
//!
//! ## Data Hierarchy
//!
//! - Level 1: Provinsi (`provinsi`)
//! - Level 2: Kabupaten/Kota (`kabupaten_kota`)
//! - Level 3: Kecamatan (`kecamatan`)
//! - Level 4: Desa/Kelurahan (`desa`)
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/regions/provinsi` | List provinces |
//! | GET | `/api/regions/provinsi/{kode}` | Get province by code |
//! | GET | `/api/regions/provinsi/{kode}/kabupaten-kota` | List regencies in a province |
//! | GET | `/api/regions/kabupaten-kota/{kode}` | Get regency by code |
//! | GET | `/api/regions/kabupaten-kota/{kode}/kecamatan` | List districts in a regency |
//! | GET | `/api/regions/kecamatan/{kode}` | Get district by code |
//! | GET | `/api/regions/kecamatan/{kode}/desa` | List villages in a district |
//! | GET | `/api/regions/desa/{kode}` | Get village by code |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::RegionService;
