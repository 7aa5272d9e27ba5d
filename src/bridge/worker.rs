//! # Worker Process
//!
//! Launches the JVM bridge entry point, feeds it the request document on
//! stdin and relays its output until it exits.
//!
//! Both output pipes are drained by dedicated threads for the whole life of
//! the process, so the worker can never block on a full pipe while we are
//! still writing its input or waiting for it to exit. The wait only
//! completes once both relays reached end of stream.

use std::ffi::OsString;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use tracing::{debug, trace, warn};

use crate::config::BridgeConfig;
use crate::defaults;
use crate::logging::WORKER_TARGET;
use crate::error::{DslError, Result};

/// Sub-commands understood by the bridge entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeCommand {
    Run,
    /// Save the plan in the engine's portable (JMX) format.
    SaveAsJmx,
    /// Open the element in the engine's viewer.
    ShowInGui,
}

impl BridgeCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            BridgeCommand::Run => "run",
            BridgeCommand::SaveAsJmx => "saveAsJmx",
            BridgeCommand::ShowInGui => "showInGui",
        }
    }
}

impl std::fmt::Display for BridgeCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Argument list: `[jvm args] [log config] [user agent] -cp <classpath>
/// <main class> <command> [output]`.
pub fn worker_args(
    config: &BridgeConfig,
    classpath: &OsString,
    command: BridgeCommand,
    output: Option<&Path>,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = config.jvm_args.iter().map(OsString::from).collect();
    if let Some(log_config) = &config.log_config {
        let mut arg = OsString::from("-Dlog4j2.configurationFile=");
        arg.push(log_config);
        args.push(arg);
    }
    args.push(OsString::from(format!(
        "-D{}={}/{}",
        defaults::USER_AGENT_PROPERTY,
        defaults::USER_AGENT_PRODUCT,
        crate::VERSION
    )));
    args.push(OsString::from("-cp"));
    args.push(classpath.clone());
    args.push(OsString::from(defaults::MAIN_CLASS));
    args.push(OsString::from(command.as_str()));
    if let Some(path) = output {
        args.push(path.as_os_str().to_owned());
    }
    args
}

/// Run the worker to completion with `request` (an already serialized
/// document) on its stdin.
pub fn run_worker(
    config: &BridgeConfig,
    classpath: &OsString,
    command: BridgeCommand,
    output: Option<&Path>,
    request: &[u8],
) -> Result<()> {
    let args = worker_args(config, classpath, command, output);
    debug!(
        "Launching worker: {} {}",
        config.java.display(),
        args.iter()
            .map(|a| a.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    );

    let mut child = Command::new(&config.java)
        .args(&args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            io::Error::new(
                e.kind(),
                format!("Failed to launch {}: {}", config.java.display(), e),
            )
        })?;

    let relays: Vec<JoinHandle<()>> = [
        child.stdout.take().map(|out| spawn_relay("stdout", out, io::stdout)),
        child.stderr.take().map(|err| spawn_relay("stderr", err, io::stderr)),
    ]
    .into_iter()
    .flatten()
    .collect();

    if let Some(stdin) = child.stdin.take() {
        if let Err(e) = write_request(stdin, request) {
            stop_worker(&mut child, relays);
            return Err(e.into());
        }
    }

    let status = child.wait()?;
    join_relays(relays);
    check_status(status)
}

/// Write the request and close the worker's input.
fn write_request<W: Write>(mut stdin: W, request: &[u8]) -> io::Result<()> {
    match stdin.write_all(request).and_then(|_| stdin.flush()) {
        Ok(()) => Ok(()),
        // the worker may exit before reading its input; the exit status tells why
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            warn!("Worker closed its input before the request was fully written");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Kill and reap a worker we can no longer talk to, draining its output.
fn stop_worker(child: &mut Child, relays: Vec<JoinHandle<()>>) {
    if let Err(e) = child.kill() {
        debug!("Failed to kill worker: {}", e);
    }
    match child.wait() {
        Ok(status) => debug!("Stopped worker with {}", status),
        Err(e) => warn!("Failed to reap worker: {}", e),
    }
    join_relays(relays);
}

fn join_relays(relays: Vec<JoinHandle<()>>) {
    for relay in relays {
        if relay.join().is_err() {
            warn!("Worker output relay thread panicked");
        }
    }
}

fn check_status(status: ExitStatus) -> Result<()> {
    debug!("Worker finished with {}", status);
    if status.success() {
        Ok(())
    } else {
        Err(DslError::WorkerExecution {
            status: status.to_string(),
        })
    }
}

fn spawn_relay<R, W, F>(stream: &'static str, source: R, sink: F) -> JoinHandle<()>
where
    R: Read + Send + 'static,
    W: Write,
    F: Fn() -> W + Send + 'static,
{
    thread::spawn(move || {
        let mut reader = BufReader::new(source);
        let mut line = Vec::new();
        loop {
            line.clear();
            match reader.read_until(b'\n', &mut line) {
                Ok(0) => break,
                Ok(_) => {
                    trace!(
                        target: WORKER_TARGET,
                        stream,
                        "{}",
                        String::from_utf8_lossy(&line).trim_end()
                    );
                    let mut out = sink();
                    // the caller's stream going away must not stall the worker
                    let _ = out.write_all(&line).and_then(|_| out.flush());
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!("Failed reading worker {}: {}", stream, e);
                    break;
                }
            }
        }
    })
}
