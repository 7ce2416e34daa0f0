//! storefront CLI 分发：`run`、`hash-password`、`doctor`、`version`。

use std::io::BufRead;

use anyhow::{Context, anyhow, bail};
use serde_json::json;

use crate::{
    auth::credential::hash_password,
    config::{ADDR_ENV, ADMIN_PASSWORD_HASH_ENV, CLOUDINARY_ENVS, DEFAULT_ADDR, JWT_SECRET_ENV},
};

/// CLI 分发结果。
pub(crate) enum CliDispatch {
    /// 继续进入 HTTP 服务主循环。
    Run,
    /// 命令已处理完成，主程序应退出。
    Exit,
}

/// 解析并执行 storefront CLI。
pub(crate) fn dispatch(args: &[String]) -> anyhow::Result<CliDispatch> {
    if args.is_empty() {
        return Ok(CliDispatch::Run);
    }

    let cmd = args[0].trim();
    if cmd.is_empty() || cmd == "run" {
        return Ok(CliDispatch::Run);
    }

    if matches!(cmd, "-h" | "--help" | "help") {
        print_root_help();
        return Ok(CliDispatch::Exit);
    }

    match cmd {
        "hash-password" => {
            let plaintext = match args.get(1) {
                Some(value) => value.clone(),
                None => read_stdin_line()?,
            };
            println!("{}", hash_plaintext(&plaintext)?);
            Ok(CliDispatch::Exit)
        }
        "doctor" => {
            let format = parse_doctor_format(&args[1..])?;
            let report = DoctorReport::from_lookup(|key| std::env::var(key).ok());
            report.print(format);
            if !report.healthy() {
                std::process::exit(1);
            }
            Ok(CliDispatch::Exit)
        }
        "version" => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(CliDispatch::Exit)
        }
        other => Err(anyhow!(
            "unknown command: {other}; run `boutique-storefront --help` for usage"
        )),
    }
}

/// 读取标准输入的一行（去掉行尾换行）。
fn read_stdin_line() -> anyhow::Result<String> {
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("read password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// 生成管理员口令哈希；空口令直接拒绝。
fn hash_plaintext(plaintext: &str) -> anyhow::Result<String> {
    if plaintext.is_empty() {
        bail!("usage: boutique-storefront hash-password [<plaintext>]");
    }
    hash_password(plaintext).context("hash password")
}

/// `doctor` 输出格式。
#[derive(Debug, PartialEq, Eq)]
enum DoctorFormat {
    Text,
    Json,
}

/// 解析 doctor 的 `--format` 参数。
fn parse_doctor_format(args: &[String]) -> anyhow::Result<DoctorFormat> {
    if args.is_empty() {
        return Ok(DoctorFormat::Text);
    }
    if args.len() == 2 && args[0] == "--format" {
        return match args[1].as_str() {
            "text" => Ok(DoctorFormat::Text),
            "json" => Ok(DoctorFormat::Json),
            other => Err(anyhow!("unsupported doctor format: {other}")),
        };
    }
    Err(anyhow!("usage: boutique-storefront doctor [--format text|json]"))
}

/// 配置健康度快照（不含任何密钥内容）。
#[derive(Debug)]
struct DoctorReport {
    addr: String,
    signing_secret: bool,
    admin_password_hash: bool,
    media_uploads: bool,
}

impl DoctorReport {
    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let present = |key: &str| lookup(key).is_some_and(|value| !value.trim().is_empty());
        Self {
            addr: lookup(ADDR_ENV)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_ADDR.to_string()),
            signing_secret: present(JWT_SECRET_ENV),
            admin_password_hash: present(ADMIN_PASSWORD_HASH_ENV),
            media_uploads: CLOUDINARY_ENVS.into_iter().all(present),
        }
    }

    /// 签名密钥与口令哈希齐全才算健康。
    fn healthy(&self) -> bool {
        self.signing_secret && self.admin_password_hash
    }

    fn print(&self, format: DoctorFormat) {
        let yes_no = |flag: bool| if flag { "yes" } else { "no" };
        match format {
            DoctorFormat::Text => {
                println!("listen-addr: {}", self.addr);
                println!("signing-secret: {}", yes_no(self.signing_secret));
                println!("admin-password-hash: {}", yes_no(self.admin_password_hash));
                println!("media-uploads: {}", yes_no(self.media_uploads));
            }
            DoctorFormat::Json => {
                let payload = json!({
                    "listenAddr": self.addr,
                    "signingSecret": self.signing_secret,
                    "adminPasswordHash": self.admin_password_hash,
                    "mediaUploads": self.media_uploads,
                    "healthy": self.healthy(),
                });
                println!(
                    "{}",
                    serde_json::to_string_pretty(&payload).unwrap_or_else(|_| "{}".to_string())
                );
            }
        }
    }
}

/// 打印 root help。
fn print_root_help() {
    println!("boutique-storefront usage:");
    println!("  boutique-storefront run");
    println!("  boutique-storefront hash-password [<plaintext>]");
    println!("  boutique-storefront doctor [--format text|json]");
    println!("  boutique-storefront version");
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::{DoctorFormat, DoctorReport, hash_plaintext, parse_doctor_format};
    use crate::{
        auth::credential::CredentialVerifier,
        config::{ADDR_ENV, CLOUDINARY_ENVS, Config},
    };

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn doctor_format_parsing() {
        assert_eq!(parse_doctor_format(&[]).unwrap(), DoctorFormat::Text);
        assert_eq!(
            parse_doctor_format(&args(&["--format", "json"])).unwrap(),
            DoctorFormat::Json
        );
        assert!(parse_doctor_format(&args(&["--format", "yaml"])).is_err());
        assert!(parse_doctor_format(&args(&["--format"])).is_err());
    }

    #[test]
    fn doctor_requires_secret_and_hash() {
        let env: HashMap<&str, &str> = [
            ("JWT_SECRET", "s3cret"),
            ("ADMIN_PASSWORD_HASH", "$2b$10$abcdefghijklmnopqrstuv"),
        ]
        .into_iter()
        .collect();
        let report = DoctorReport::from_lookup(|key| env.get(key).map(|v| v.to_string()));
        assert!(report.healthy());
        assert!(!report.media_uploads);
        assert_eq!(report.addr, "0.0.0.0:3000");

        let report = DoctorReport::from_lookup(|key| {
            (key == "JWT_SECRET").then(|| "s3cret".to_string())
        });
        assert!(!report.healthy());

        let report = DoctorReport::from_lookup(|key| {
            (key == "ADMIN_PASSWORD_HASH").then(|| "hash".to_string())
        });
        assert!(!report.healthy());
    }

    #[test]
    fn doctor_reads_the_same_variables_as_config() {
        let mut env: HashMap<&str, &str> = [
            ("JWT_SECRET", "s3cret"),
            (ADDR_ENV, "127.0.0.1:8088"),
        ]
        .into_iter()
        .collect();
        env.extend(CLOUDINARY_ENVS.map(|key| (key, "value")));
        let lookup = |key: &str| env.get(key).map(|v| v.to_string());

        let report = DoctorReport::from_lookup(lookup);
        let config = Config::from_lookup(lookup).unwrap();
        assert_eq!(report.addr, config.addr);
        assert_eq!(report.media_uploads, config.cloudinary.is_some());
        assert!(report.media_uploads);
    }

    #[test]
    fn hashed_plaintext_verifies() {
        assert!(hash_plaintext("").is_err());
        let hash = hash_plaintext("admin-secret").unwrap();
        let verifier = CredentialVerifier::new(hash);
        assert!(verifier.verify("admin-secret"));
        assert!(!verifier.verify("admin-secreT"));
    }
}
