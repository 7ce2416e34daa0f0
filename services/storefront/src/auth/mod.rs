//! 管理员鉴权：口令校验、会话 token 与请求闸口。

pub(crate) mod credential;
pub(crate) mod gate;
pub(crate) mod handlers;
pub(crate) mod token;
