use std::io;
use std::process::{Command, Stdio};

/// Runs external tools. Injected wherever a process boundary has to be tested.
pub trait CommandRunner {
    /// Run `argv` to completion; `Ok(true)` on a zero exit status.
    fn run(&self, argv: &[String]) -> io::Result<bool>;

    /// Start `argv` and leave it running.
    fn spawn(&self, argv: &[String]) -> io::Result<()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCommands {
    pub quiet: bool,
}

impl SystemCommands {
    fn command(&self, argv: &[String]) -> io::Result<Command> {
        let Some((program, args)) = argv.split_first() else {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "empty command"));
        };

        let mut command = Command::new(program);
        command.args(args);
        if self.quiet {
            command.stdout(Stdio::null()).stderr(Stdio::null());
        }
        Ok(command)
    }
}

impl CommandRunner for SystemCommands {
    fn run(&self, argv: &[String]) -> io::Result<bool> {
        tracing::debug!("running {}", argv.join(" "));
        Ok(self.command(argv)?.status()?.success())
    }

    fn spawn(&self, argv: &[String]) -> io::Result<()> {
        tracing::debug!("starting {}", argv.join(" "));
        self.command(argv)?.spawn()?;
        Ok(())
    }
}
