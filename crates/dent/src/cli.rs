//! Command-line interface for `dent`.

use std::path::PathBuf;

use clap::Parser;

use crate::enter::EnterRequest;

/// Enter a Docker container, creating or starting it when needed.
#[derive(Parser, Debug)]
#[command(name = "dent", version, about)]
pub struct Cli {
    /// Container name, or image to derive the container from
    pub target: Option<String>,

    /// Command to run instead of a shell (after `--`)
    #[arg(last = true)]
    pub command: Vec<String>,

    /// Container name to use or create
    #[arg(short = 'n', long)]
    pub name: Option<String>,

    /// Image to create the container from
    #[arg(short = 'i', long)]
    pub image: Option<String>,

    /// Base image to try when no target is given (repeatable, in order)
    #[arg(short = 'b', long = "base", value_name = "IMAGE")]
    pub base_images: Vec<String>,

    /// User to run the session as
    #[arg(short = 'u', long)]
    pub user: Option<String>,

    /// Working directory inside the container
    #[arg(short = 'w', long)]
    pub workdir: Option<String>,

    /// Environment variable KEY=VALUE (repeatable)
    #[arg(short = 'e', long = "env", value_name = "KEY=VALUE")]
    pub env: Vec<String>,

    /// Bind mount for a new container, as for `docker run -v` (repeatable)
    #[arg(short = 'v', long = "volume", value_name = "SPEC")]
    pub volumes: Vec<String>,

    /// Mount the current directory at the same path and start there
    #[arg(long)]
    pub mount_cwd: bool,

    /// Remove the container when the session ends
    #[arg(long)]
    pub rm: bool,

    /// Never allocate a TTY
    #[arg(short = 'T', long)]
    pub no_tty: bool,

    /// Fail instead of pulling a missing image
    #[arg(long)]
    pub no_pull: bool,

    /// Print the docker commands instead of running them
    #[arg(long)]
    pub dry_run: bool,

    /// Docker daemon address (socket path, unix:// or tcp://)
    #[arg(short = 'H', long = "host", value_name = "HOST")]
    pub host: Option<String>,

    /// List containers created by dent and exit
    #[arg(short = 'l', long, conflicts_with_all = ["target", "command", "name", "image"])]
    pub list: bool,

    /// Configuration file (default: $DENT_CONFIG or ~/.config/dent/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// More logging on stderr (repeat for trace)
    #[arg(long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Build the request; `stdin_is_tty` and `cwd` come from the process.
    pub fn into_request(self, stdin_is_tty: bool, cwd: Option<PathBuf>) -> EnterRequest {
        EnterRequest {
            target: self.target,
            name: self.name,
            image: self.image,
            base_images: self.base_images,
            command: self.command,
            user: self.user,
            workdir: self.workdir,
            env: self.env,
            volumes: self.volumes,
            mount_cwd: if self.mount_cwd { cwd } else { None },
            remove_after: self.rm,
            tty: stdin_is_tty && !self.no_tty,
            pull: !self.no_pull,
            dry_run: self.dry_run,
        }
    }
}
