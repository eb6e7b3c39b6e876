pub mod aero;
pub mod cl;
pub mod curve;
pub mod erc1155;
pub mod erc20;
pub mod erc721;
pub mod factory;
pub mod v2;
pub mod v3;
pub mod weth;

pub use factory::IPoolFactory;
