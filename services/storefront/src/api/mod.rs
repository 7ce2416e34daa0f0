//! HTTP 接口公共层：错误与请求/响应类型。

pub(crate) mod error;
pub(crate) mod types;
