pub mod auth;
pub mod cache;
pub mod checksum;
pub mod download;
pub mod repository;

pub use cache::LocalStore;
pub use download::{Downloader, HttpDownloader};
pub use repository::MavenRepository;
