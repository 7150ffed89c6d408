//! `dtstat init`: write template configuration files into the working
//! directory so a new deployment can be edited into shape.

use crate::config::{DEFAULT_MEMBER_CNF, DEFAULT_SETTINGS_CNF, DEFAULT_VERSION_CNF};
use crate::io;
use anyhow::Result;
use std::path::PathBuf;

pub fn init_config(force: bool) -> Result<()> {
    let templates = [
        (DEFAULT_MEMBER_CNF, io::MEMBER_TEMPLATE),
        (DEFAULT_VERSION_CNF, io::VERSION_TEMPLATE),
        (DEFAULT_SETTINGS_CNF, io::SETTINGS_TEMPLATE),
    ];
    for (name, contents) in templates {
        let path = PathBuf::from(name);
        if io::write_template(&path, contents, force)? {
            println!("Created {name}");
        } else {
            println!("{name} already exists. Use --force to overwrite.");
        }
    }
    Ok(())
}
