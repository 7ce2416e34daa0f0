//! 媒体上传代理。

pub(crate) mod handlers;
pub(crate) mod upload;
