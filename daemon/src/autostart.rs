//! Run-on-login toggle backed by an XDG autostart desktop entry

use crate::error::AutostartError;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const DESKTOP_FILE: &str = "cpuwatch.desktop";

pub struct Autostart {
    path: PathBuf,
    exec: PathBuf,
}

impl Autostart {
    /// Entry in `~/.config/autostart` launching the running executable.
    pub fn for_current_user() -> Result<Self, AutostartError> {
        let dirs = directories::BaseDirs::new().ok_or(AutostartError::NoHomeDir)?;
        let exec = std::env::current_exe()?;
        Ok(Self::at(dirs.config_dir().join("autostart").join(DESKTOP_FILE), exec))
    }

    pub fn at(path: impl Into<PathBuf>, exec: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            exec: exec.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_enabled(&self) -> bool {
        self.path.exists()
    }

    pub fn enable(&self) -> Result<(), AutostartError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, self.desktop_entry())?;
        Ok(())
    }

    pub fn disable(&self) -> Result<(), AutostartError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn set(&self, enabled: bool) -> Result<(), AutostartError> {
        if enabled {
            self.enable()
        } else {
            self.disable()
        }
    }

    fn desktop_entry(&self) -> String {
        format!(
            "[Desktop Entry]\n\
             Type=Application\n\
             Name=CPU Monitor\n\
             Comment=Monitor CPU usage and warn about runaway processes\n\
             Exec={}\n\
             Icon=utilities-system-monitor\n\
             Terminal=false\n\
             Categories=System;Monitor;\n\
             StartupNotify=false\n",
            quote_exec_arg(&self.exec.to_string_lossy())
        )
    }
}

/// Quotes a path for an `Exec` key. Reserved characters get a backslash inside
/// double quotes, `%` is doubled so it is not read as a field code, then every
/// backslash is doubled again for the string value.
fn quote_exec_arg(arg: &str) -> String {
    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('"');
    for c in arg.chars() {
        match c {
            '"' | '`' | '$' | '\\' => quoted.push('\\'),
            '%' => quoted.push('%'),
            _ => {}
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted.replace('\\', "\\\\")
}
