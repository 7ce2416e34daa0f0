//! 商品目录、店铺配置与内容页。

pub(crate) mod handlers;
pub(crate) mod store;
