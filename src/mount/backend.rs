//! Platform mount backends
//!
//! Each backend wraps the native tooling for one platform: `mount_smbfs` on
//! macOS, `mount -t cifs` on Linux and `net use` on Windows. Every process is
//! bounded by a timeout and killed when it expires.

use async_trait::async_trait;
use log::debug;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::process::Command;

use crate::error::MountError;
use crate::mount::candidates::{Credentials, ShareCandidate};
use crate::mount::results::MountEntry;

/// Timeout for commands that only read state (`mount`, `net use`)
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for the diagnostic reachability probe
pub const PING_TIMEOUT: Duration = Duration::from_secs(5);

/// Output of a finished command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Operations the auto-mounter needs from the operating system
#[async_trait]
pub trait MountBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether mount points are directories the mounter has to create
    fn creates_mount_point(&self) -> bool {
        true
    }

    /// Attach `share` at `mount_point`
    async fn mount(
        &self,
        share: &ShareCandidate,
        mount_point: &Path,
        timeout: Duration,
    ) -> Result<(), MountError>;

    /// Currently mounted network filesystems
    async fn mount_table(&self) -> Result<Vec<MountEntry>, MountError>;

    /// Hand the share address to the desktop's own connection flow
    async fn open_native(&self, address: &str, timeout: Duration) -> Result<(), MountError>;

    /// Whether the host answers a single ping
    async fn ping(&self, host: &str) -> bool;
}

/// Run a command, killing it if it outlives `timeout`
pub async fn run_command(
    program: &str,
    args: &[String],
    timeout: Duration,
) -> Result<CommandOutput, MountError> {
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = match tokio::time::timeout(timeout, command.output()).await {
        Ok(result) => result.map_err(|source| MountError::Spawn {
            program: program.to_string(),
            source,
        })?,
        Err(_) => {
            return Err(MountError::Timeout {
                program: program.to_string(),
                after: timeout,
            });
        }
    };

    Ok(CommandOutput {
        // -1 when killed by a signal
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    })
}

async fn run_checked(
    program: &str,
    args: &[String],
    timeout: Duration,
) -> Result<CommandOutput, MountError> {
    let output = run_command(program, args, timeout).await?;
    if output.exit_code != 0 {
        return Err(MountError::CommandFailed {
            program: program.to_string(),
            code: output.exit_code,
            stderr: output.stderr,
        });
    }
    Ok(output)
}

async fn ping_with(args: Vec<String>) -> bool {
    match run_command("ping", &args, PING_TIMEOUT).await {
        Ok(out) => out.exit_code == 0,
        Err(e) => {
            debug!("ping failed: {}", e);
            false
        }
    }
}

/// Parse `mount` output from macOS or Linux.
///
/// macOS: `//user@host/share on /Volumes/share (smbfs, nodev)`
/// Linux: `//host/share on /mnt/share type cifs (rw,relatime)`
pub fn parse_unix_mount_table(output: &str) -> Vec<MountEntry> {
    output
        .lines()
        .filter_map(|line| {
            let (source, rest) = line.split_once(" on ")?;
            let end = [rest.find(" type "), rest.find(" (")]
                .into_iter()
                .flatten()
                .min()
                .unwrap_or(rest.len());
            let point = rest[..end].trim();
            if point.is_empty() {
                return None;
            }
            Some(MountEntry {
                source: source.trim().to_string(),
                mount_point: PathBuf::from(point),
            })
        })
        .collect()
}

/// Parse `net use` output.
///
/// `OK           Z:        \\host\share       Microsoft Windows Network`
pub fn parse_net_use(output: &str) -> Vec<MountEntry> {
    output
        .lines()
        .filter_map(|line| {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let remote = tokens.iter().find(|t| t.starts_with("\\\\"))?;
            let drive = tokens
                .iter()
                .find(|t| t.len() == 2 && t.ends_with(':'))?;
            Some(MountEntry {
                source: remote.to_string(),
                mount_point: PathBuf::from(format!("{}\\", drive)),
            })
        })
        .collect()
}

/// `//user:password@host/share` with user info percent-encoded, so `@`, `:`
/// or `/` in a password cannot change how the URL is split
pub fn smbfs_url(share: &ShareCandidate) -> String {
    let encode = |s: &str| utf8_percent_encode(s, NON_ALPHANUMERIC).to_string();
    match &share.credentials {
        Credentials::User {
            name,
            password: Some(pw),
        } => format!("//{}:{}@{}/{}", encode(name), encode(pw), share.host, share.share),
        Credentials::User {
            name,
            password: None,
        } => format!("//{}@{}/{}", encode(name), share.host, share.share),
        Credentials::Guest => format!("//guest:@{}/{}", share.host, share.share),
        Credentials::Anonymous => format!("//{}/{}", share.host, share.share),
    }
}

/// `-o` value for `mount -t cifs`. Named users authenticate through
/// `credentials_file`, never inline.
pub fn cifs_options(credentials: &Credentials, credentials_file: Option<&Path>) -> String {
    match (credentials, credentials_file) {
        (Credentials::User { .. }, Some(file)) => {
            format!("credentials={},vers=3.0", file.display())
        }
        (Credentials::User { name, .. }, None) => format!("username={},vers=3.0", name),
        (Credentials::Guest, _) => "guest,vers=3.0".to_string(),
        (Credentials::Anonymous, _) => "username=,password=,sec=none".to_string(),
    }
}

/// Body of a mount.cifs credentials file
pub fn cifs_credentials(name: &str, password: Option<&str>) -> String {
    format!("username={}\npassword={}\n", name, password.unwrap_or(""))
}

/// Owner-only temp file holding the credentials
fn write_cifs_credentials(name: &str, password: Option<&str>) -> Result<NamedTempFile, MountError> {
    let mut file = tempfile::Builder::new()
        .prefix(".studio-cifs-")
        .tempfile()
        .map_err(MountError::CredentialsFile)?;
    file.write_all(cifs_credentials(name, password).as_bytes())
        .and_then(|()| file.flush())
        .map_err(MountError::CredentialsFile)?;
    Ok(file)
}

/// macOS `mount_smbfs`
#[derive(Debug, Default)]
pub struct SmbfsMounter;

#[async_trait]
impl MountBackend for SmbfsMounter {
    fn name(&self) -> &'static str {
        "mount_smbfs"
    }

    async fn mount(
        &self,
        share: &ShareCandidate,
        mount_point: &Path,
        timeout: Duration,
    ) -> Result<(), MountError> {
        let url = smbfs_url(share);
        let args = vec![
            "-N".to_string(),
            url,
            mount_point.to_string_lossy().to_string(),
        ];
        run_checked("mount_smbfs", &args, timeout).await.map(|_| ())
    }

    async fn mount_table(&self) -> Result<Vec<MountEntry>, MountError> {
        let out = run_checked("mount", &[], QUERY_TIMEOUT).await?;
        Ok(parse_unix_mount_table(&out.stdout))
    }

    async fn open_native(&self, address: &str, timeout: Duration) -> Result<(), MountError> {
        run_checked("open", &[address.to_string()], timeout)
            .await
            .map(|_| ())
    }

    async fn ping(&self, host: &str) -> bool {
        ping_with(vec!["-c".into(), "1".into(), "-t".into(), "2".into(), host.into()]).await
    }
}

/// Linux `mount -t cifs`
#[derive(Debug, Default)]
pub struct CifsMounter;

#[async_trait]
impl MountBackend for CifsMounter {
    fn name(&self) -> &'static str {
        "mount.cifs"
    }

    async fn mount(
        &self,
        share: &ShareCandidate,
        mount_point: &Path,
        timeout: Duration,
    ) -> Result<(), MountError> {
        // password goes through the file, never the command line; the file is
        // deleted on drop, after the mount command returns
        let credentials_file = match &share.credentials {
            Credentials::User { name, password } => {
                Some(write_cifs_credentials(name, password.as_deref())?)
            }
            Credentials::Guest | Credentials::Anonymous => None,
        };
        let options = cifs_options(
            &share.credentials,
            credentials_file.as_ref().map(|f| f.path()),
        );
        let args = vec![
            "-t".to_string(),
            "cifs".to_string(),
            format!("//{}/{}", share.host, share.share),
            mount_point.to_string_lossy().to_string(),
            "-o".to_string(),
            options,
        ];
        run_checked("mount", &args, timeout).await.map(|_| ())
    }

    async fn mount_table(&self) -> Result<Vec<MountEntry>, MountError> {
        let out = run_checked("mount", &[], QUERY_TIMEOUT).await?;
        Ok(parse_unix_mount_table(&out.stdout))
    }

    async fn open_native(&self, address: &str, timeout: Duration) -> Result<(), MountError> {
        run_checked("gio", &["mount".to_string(), address.to_string()], timeout)
            .await
            .map(|_| ())
    }

    async fn ping(&self, host: &str) -> bool {
        ping_with(vec!["-c".into(), "1".into(), "-W".into(), "2".into(), host.into()]).await
    }
}

/// Windows `net use` drive mapping
#[derive(Debug, Default)]
pub struct NetUseMapper;

#[async_trait]
impl MountBackend for NetUseMapper {
    fn name(&self) -> &'static str {
        "net use"
    }

    fn creates_mount_point(&self) -> bool {
        false
    }

    async fn mount(
        &self,
        share: &ShareCandidate,
        mount_point: &Path,
        timeout: Duration,
    ) -> Result<(), MountError> {
        let drive = mount_point
            .to_string_lossy()
            .trim_end_matches('\\')
            .to_string();
        let mut args = vec![
            "use".to_string(),
            drive,
            format!("\\\\{}\\{}", share.host, share.share),
        ];
        match &share.credentials {
            Credentials::User { name, password } => {
                args.push(password.clone().unwrap_or_default());
                args.push(format!("/user:{}", name));
            }
            Credentials::Guest => {
                args.push(String::new());
                args.push("/user:guest".to_string());
            }
            Credentials::Anonymous => {}
        }
        args.push("/persistent:no".to_string());
        run_checked("net", &args, timeout).await.map(|_| ())
    }

    async fn mount_table(&self) -> Result<Vec<MountEntry>, MountError> {
        let out = run_checked("net", &["use".to_string()], QUERY_TIMEOUT).await?;
        Ok(parse_net_use(&out.stdout))
    }

    async fn open_native(&self, address: &str, timeout: Duration) -> Result<(), MountError> {
        // explorer exits non-zero even when the window opens
        run_command("explorer", &[address.to_string()], timeout)
            .await
            .map(|_| ())
    }

    async fn ping(&self, host: &str) -> bool {
        ping_with(vec!["-n".into(), "1".into(), "-w".into(), "2000".into(), host.into()]).await
    }
}

/// Backend for the platform this binary was built for
pub fn platform_backend() -> Box<dyn MountBackend> {
    if cfg!(windows) {
        Box::new(NetUseMapper)
    } else if cfg!(target_os = "macos") {
        Box::new(SmbfsMounter)
    } else {
        Box::new(CifsMounter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_macos_mount_line() {
        let out = "/dev/disk1s1 on / (apfs, local, journaled)\n\
                   //studio@192.168.1.100/StudioPhotos on /Volumes/StudioPhotos (smbfs, nodev, nosuid, mounted by studio)\n";
        let entries = parse_unix_mount_table(out);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].source, "//studio@192.168.1.100/StudioPhotos");
        assert_eq!(
            entries[1].mount_point,
            PathBuf::from("/Volumes/StudioPhotos")
        );
    }

    #[test]
    fn parses_linux_mount_line() {
        let out = "//192.168.1.100/StudioPhotos on /mnt/StudioPhotos type cifs (rw,relatime,vers=3.0)\n";
        let entries = parse_unix_mount_table(out);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].mount_point, PathBuf::from("/mnt/StudioPhotos"));
    }

    #[test]
    fn parses_net_use_listing() {
        let out = "New connections will not be remembered.\r\n\r\n\
                   Status       Local     Remote                    Network\r\n\
                   -------------------------------------------------------------------------------\r\n\
                   OK           Z:        \\\\192.168.1.100\\StudioPhotos  Microsoft Windows Network\r\n\
                   The command completed successfully.\r\n";
        let entries = parse_net_use(out);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].source, "\\\\192.168.1.100\\StudioPhotos");
        assert_eq!(entries[0].mount_point, PathBuf::from("Z:\\"));
    }

    fn user(password: &str) -> ShareCandidate {
        ShareCandidate {
            host: "192.168.1.100".into(),
            share: "StudioPhotos".into(),
            credentials: Credentials::User {
                name: "studio".into(),
                password: Some(password.into()),
            },
        }
    }

    #[test]
    fn smbfs_url_escapes_user_info() {
        let url = smbfs_url(&user("p@ss:w/rd,1"));
        assert_eq!(url, "//studio:p%40ss%3Aw%2Frd%2C1@192.168.1.100/StudioPhotos");
        assert_eq!(url.matches('@').count(), 1);
    }

    #[test]
    fn cifs_options_never_carry_the_password() {
        let share = user("se,cret=1");
        let file = Path::new("/tmp/.studio-cifs-x");
        let options = cifs_options(&share.credentials, Some(file));
        assert_eq!(options, "credentials=/tmp/.studio-cifs-x,vers=3.0");
        assert!(!options.contains("se,cret"));
        assert_eq!(
            cifs_credentials("studio", Some("se,cret=1")),
            "username=studio\npassword=se,cret=1\n"
        );
    }

    #[test]
    fn cifs_credentials_file_is_written_and_removed() {
        let file = write_cifs_credentials("studio", Some("p@ss")).unwrap();
        let path = file.path().to_path_buf();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "username=studio\npassword=p@ss\n"
        );
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o077, 0);
        }
        drop(file);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn command_timeout_is_reported() {
        if cfg!(windows) {
            return;
        }
        let err = run_command("sleep", &["5".to_string()], Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, MountError::Timeout { .. }));
    }
}
