use std::time::Duration;

use anyhow::{Context, Result};

use b3clf::config::Settings;
use b3clf::descriptors::{CommandTool, DescriptorTool};

use crate::cli::DescriptorToolOptions;

fn seconds(flag: &str, value: Option<f64>) -> Result<Option<Duration>> {
    value
        .map(|s| Duration::try_from_secs_f64(s).with_context(|| format!("invalid {flag} value {s}")))
        .transpose()
}

/// A command template from the flags or the settings file, else PaDEL with
/// flag overrides.
pub fn build_descriptor_tool(
    opts: &DescriptorToolOptions,
    settings: &Settings,
) -> Result<Box<dyn DescriptorTool>> {
    if let Some(template) = &opts.descriptor_command {
        return Ok(Box::new(CommandTool::parse(template)?));
    }
    if settings.descriptors.command.is_some() {
        return Ok(settings.descriptor_tool()?);
    }

    let mut tool = settings.padel_tool()?;
    if let Some(java) = &opts.java {
        tool.java = java.clone();
    }
    if let Some(jar) = &opts.padel_jar {
        tool.jar = jar.clone();
    }
    if let Some(threads) = opts.threads {
        tool.threads = threads;
    }
    if let Some(limit) = seconds("--max-runtime-per-mol", opts.max_runtime_per_molecule)? {
        tool.max_runtime_per_molecule = Some(limit);
    }
    Ok(Box::new(tool))
}

pub fn build_descriptor_timeout(
    opts: &DescriptorToolOptions,
    settings: &Settings,
) -> Result<Option<Duration>> {
    match seconds("--timeout", opts.timeout)? {
        Some(timeout) => Ok(Some(timeout)),
        None => Ok(settings.descriptor_timeout()?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn no_flags() -> DescriptorToolOptions {
        DescriptorToolOptions {
            java: None,
            padel_jar: None,
            threads: None,
            descriptor_command: None,
            timeout: None,
            max_runtime_per_molecule: None,
        }
    }

    fn settings(text: &str) -> Settings {
        Settings::from_toml(text, Path::new("b3clf.toml")).unwrap()
    }

    #[test]
    fn defaults_to_padel() {
        let tool = build_descriptor_tool(&no_flags(), &Settings::default()).unwrap();
        assert_eq!(tool.name(), "PaDEL-Descriptor");
    }

    #[test]
    fn command_flag_wins_over_settings() {
        let mut opts = no_flags();
        opts.descriptor_command = Some("mordred {input} -o {output}".into());
        let tool = build_descriptor_tool(&opts, &settings("[descriptors]\ncommand = \"other {input} {output}\"\n"))
            .unwrap();
        assert_eq!(tool.name(), "mordred");
    }

    #[test]
    fn settings_command_replaces_padel() {
        let tool =
            build_descriptor_tool(&no_flags(), &settings("[descriptors]\ncommand = \"other {input} {output}\"\n"))
                .unwrap();
        assert_eq!(tool.name(), "other");
    }

    #[test]
    fn template_without_placeholders_is_rejected() {
        let mut opts = no_flags();
        opts.descriptor_command = Some("mordred in.sdf".into());
        assert!(build_descriptor_tool(&opts, &Settings::default()).is_err());
    }

    #[test]
    fn timeout_flag_overrides_settings() {
        let s = settings("[descriptors]\ntimeout_secs = 30.0\n");
        assert_eq!(
            build_descriptor_timeout(&no_flags(), &s).unwrap(),
            Some(Duration::from_secs(30))
        );

        let mut opts = no_flags();
        opts.timeout = Some(2.5);
        assert_eq!(
            build_descriptor_timeout(&opts, &s).unwrap(),
            Some(Duration::from_millis(2500))
        );
    }

    #[test]
    fn negative_timeout_is_rejected() {
        let mut opts = no_flags();
        opts.timeout = Some(-1.0);
        assert!(build_descriptor_timeout(&opts, &Settings::default()).is_err());
    }
}
