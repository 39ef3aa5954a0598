pub mod commit_driver;
pub mod create_asset;
pub mod query_assets;
pub mod sdk;
