//! socat backend — launch a detached `socat` that does the forwarding.

use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::info;

use crate::conf::Owner;
use crate::error::{ProxyError, ProxyResult};
use crate::socket::clear_stale;

/// socat address pair forwarding `listen` to `target`.
pub fn socat_args(listen: &Path, target: &Path, mode: u32, owner: Option<Owner>) -> Vec<String> {
    let mut listen_addr = format!("UNIX-LISTEN:{},fork,mode={:o}", listen.display(), mode);
    if let Some(owner) = owner {
        listen_addr.push_str(&format!(",user={}", owner.uid));
        if let Some(gid) = owner.gid {
            listen_addr.push_str(&format!(",group={}", gid));
        }
    }
    listen_addr.push_str(",unlink-early");
    vec![listen_addr, format!("UNIX-CONNECT:{}", target.display())]
}

/// Start socat in the background and return its pid. The child is not waited on.
pub async fn spawn(listen: &Path, target: &Path, mode: u32, owner: Option<Owner>) -> ProxyResult<u32> {
    // socat's unlink-early would happily delete a regular file or a live socket.
    clear_stale(listen).await?;

    let args = socat_args(listen, target, mode, owner);
    let pid = spawn_detached("socat", &args).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ProxyError::SocatNotFound,
        _ => ProxyError::Io(e),
    })?;

    info!(pid, args = ?args, "Started socat");
    Ok(pid)
}

/// Spawn `program` in its own process group so signals sent to ours
/// (Ctrl-C, terminal hangup) do not reach it.
fn spawn_detached(program: &str, args: &[String]) -> std::io::Result<u32> {
    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .process_group(0)
        .spawn()?;
    Ok(child.id())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_without_owner() {
        let args = socat_args(Path::new("/run/user/1000/docker.sock"), Path::new("/var/run/docker.sock"), 0o600, None);
        assert_eq!(
            args,
            vec![
                "UNIX-LISTEN:/run/user/1000/docker.sock,fork,mode=600,unlink-early",
                "UNIX-CONNECT:/var/run/docker.sock",
            ]
        );
    }

    #[test]
    fn test_args_with_owner() {
        let owner = Owner { uid: 1000, gid: Some(100) };
        let args = socat_args(Path::new("/tmp/d.sock"), Path::new("/var/run/docker.sock"), 0o660, Some(owner));
        assert_eq!(args[0], "UNIX-LISTEN:/tmp/d.sock,fork,mode=660,user=1000,group=100,unlink-early");
    }

    #[test]
    fn test_args_uid_only() {
        let owner = Owner { uid: 0, gid: None };
        let args = socat_args(Path::new("/tmp/d.sock"), Path::new("/d"), 0o600, Some(owner));
        assert!(args[0].contains(",user=0,unlink-early"));
        assert!(!args[0].contains("group"));
    }

    #[test]
    fn test_detached_child_leads_its_own_group() {
        let pid = spawn_detached("sleep", &["5".to_string()]).expect("spawn sleep");
        let group = unsafe { libc::getpgid(pid as libc::pid_t) };
        let ours = unsafe { libc::getpgid(0) };
        unsafe { libc::kill(pid as libc::pid_t, libc::SIGKILL) };

        assert_eq!(group, pid as libc::pid_t);
        assert_ne!(group, ours);
    }
}
