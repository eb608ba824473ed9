use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use super::error::Error;

/// An external program that turns an SD file into a descriptor CSV.
///
/// The CSV must have a header row, one row per SD record in record order,
/// and a leading name column.
pub trait DescriptorTool {
    fn name(&self) -> &str;

    fn compute(&self, input_sdf: &Path, output_csv: &Path, timeout: Option<Duration>) -> Result<(), Error>;
}

/// PaDEL-Descriptor run through `java -jar`.
#[derive(Debug, Clone)]
pub struct PadelTool {
    pub java: PathBuf,
    pub jar: PathBuf,
    /// Worker threads; `-1` lets PaDEL use every core.
    pub threads: i32,
    /// Per-molecule limit passed as `-maxruntime`.
    pub max_runtime_per_molecule: Option<Duration>,
}

impl Default for PadelTool {
    fn default() -> Self {
        Self {
            java: PathBuf::from("java"),
            jar: PathBuf::from("PaDEL-Descriptor.jar"),
            threads: -1,
            max_runtime_per_molecule: None,
        }
    }
}

impl PadelTool {
    pub fn new(jar: impl Into<PathBuf>) -> Self {
        Self {
            jar: jar.into(),
            ..Self::default()
        }
    }

    fn command(&self, input_sdf: &Path, output_csv: &Path) -> Command {
        let mut cmd = Command::new(&self.java);
        cmd.arg("-jar")
            .arg(&self.jar)
            .arg("-dir")
            .arg(input_sdf)
            .arg("-file")
            .arg(output_csv)
            .arg("-2d")
            .arg("-3d")
            .arg("-retainorder")
            .arg("-threads")
            .arg(self.threads.to_string());
        if let Some(limit) = self.max_runtime_per_molecule {
            cmd.arg("-maxruntime").arg(limit.as_millis().to_string());
        }
        cmd
    }
}

impl DescriptorTool for PadelTool {
    fn name(&self) -> &str {
        "PaDEL-Descriptor"
    }

    fn compute(&self, input_sdf: &Path, output_csv: &Path, timeout: Option<Duration>) -> Result<(), Error> {
        info!(jar = %self.jar.display(), threads = self.threads, "running PaDEL-Descriptor");
        run_to_completion(self.name(), self.command(input_sdf, output_csv), timeout)
    }
}

/// Any program described by a whitespace-separated template with `{input}`
/// and `{output}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTool {
    template: String,
    program: String,
    args: Vec<String>,
}

impl CommandTool {
    pub fn parse(template: &str) -> Result<Self, Error> {
        let invalid = |details: &str| Error::InvalidTemplate {
            template: template.to_string(),
            details: details.to_string(),
        };
        let mut parts = template.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or_else(|| invalid("empty command"))?;
        let args: Vec<String> = parts.collect();
        if !args.iter().any(|a| a.contains("{input}")) {
            return Err(invalid("missing {input} placeholder"));
        }
        if !args.iter().any(|a| a.contains("{output}")) {
            return Err(invalid("missing {output} placeholder"));
        }
        Ok(Self {
            template: template.to_string(),
            program,
            args,
        })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    fn command(&self, input_sdf: &Path, output_csv: &Path) -> Command {
        let input = input_sdf.to_string_lossy();
        let output = output_csv.to_string_lossy();
        let mut cmd = Command::new(&self.program);
        for arg in &self.args {
            cmd.arg(arg.replace("{input}", &input).replace("{output}", &output));
        }
        cmd
    }
}

impl DescriptorTool for CommandTool {
    fn name(&self) -> &str {
        &self.program
    }

    fn compute(&self, input_sdf: &Path, output_csv: &Path, timeout: Option<Duration>) -> Result<(), Error> {
        run_to_completion(self.name(), self.command(input_sdf, output_csv), timeout)
    }
}

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Runs `cmd`, killing it once `timeout` has elapsed.
fn run_to_completion(tool: &str, mut cmd: Command, timeout: Option<Duration>) -> Result<(), Error> {
    debug!(?cmd, "spawning descriptor tool");
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| Error::Launch {
            tool: tool.to_string(),
            source,
        })?;

    // Drain stderr on a side thread so a chatty tool cannot fill the pipe.
    let stderr_reader = child.stderr.take().map(|mut pipe| {
        thread::spawn(move || {
            let mut text = String::new();
            let _ = pipe.read_to_string(&mut text);
            text
        })
    });

    let started = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {}
            Err(source) => {
                return Err(Error::Launch {
                    tool: tool.to_string(),
                    source,
                });
            }
        }
        if let Some(limit) = timeout {
            if started.elapsed() >= limit {
                kill(&mut child);
                return Err(Error::ToolTimedOut {
                    tool: tool.to_string(),
                    seconds: limit.as_secs_f64(),
                });
            }
        }
        thread::sleep(POLL_INTERVAL);
    };

    let stderr = stderr_reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default();
    debug!(%status, elapsed = ?started.elapsed(), "descriptor tool finished");

    if status.success() {
        Ok(())
    } else {
        Err(Error::ToolFailed {
            tool: tool.to_string(),
            status: status.to_string(),
            stderr: stderr.trim().to_string(),
        })
    }
}

fn kill(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padel_command_line() {
        let tool = PadelTool {
            max_runtime_per_molecule: Some(Duration::from_secs(2)),
            threads: 4,
            ..PadelTool::new("/opt/padel/PaDEL-Descriptor.jar")
        };
        let cmd = tool.command(Path::new("in.sdf"), Path::new("out.csv"));
        let args: Vec<String> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(cmd.get_program(), "java");
        assert_eq!(
            args,
            vec![
                "-jar",
                "/opt/padel/PaDEL-Descriptor.jar",
                "-dir",
                "in.sdf",
                "-file",
                "out.csv",
                "-2d",
                "-3d",
                "-retainorder",
                "-threads",
                "4",
                "-maxruntime",
                "2000"
            ]
        );
    }

    #[test]
    fn template_placeholders_are_required() {
        assert!(CommandTool::parse("").is_err());
        assert!(CommandTool::parse("tool {input}").is_err());
        assert!(CommandTool::parse("tool --out={output}").is_err());
        let tool = CommandTool::parse("tool -i {input} --out={output}").unwrap();
        let cmd = tool.command(Path::new("a.sdf"), Path::new("b.csv"));
        let args: Vec<String> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(args, vec!["-i", "a.sdf", "--out=b.csv"]);
    }

    #[cfg(unix)]
    #[test]
    fn failing_tool_reports_stderr() {
        let tool = CommandTool::parse("sh -c {input}{output}").unwrap();
        let err = tool
            .compute(Path::new("echo boom >&2; exit 3;"), Path::new(""), None)
            .unwrap_err();
        match err {
            Error::ToolFailed { stderr, .. } => assert_eq!(stderr, "boom"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn slow_tool_is_killed_at_deadline() {
        let tool = CommandTool::parse("sleep {input}{output}").unwrap();
        let started = Instant::now();
        let err = tool
            .compute(Path::new("5"), Path::new(""), Some(Duration::from_millis(200)))
            .unwrap_err();
        assert!(matches!(err, Error::ToolTimedOut { .. }));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn missing_program_is_a_launch_error() {
        let tool = CommandTool::parse("definitely-not-a-real-binary-b3clf {input} {output}").unwrap();
        let err = tool.compute(Path::new("a"), Path::new("b"), None).unwrap_err();
        assert!(matches!(err, Error::Launch { .. }));
    }
}
