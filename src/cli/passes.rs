use std::path::Path;

use super::{fail, load_dump_or_exit};

pub fn cmd_list_passes(tested_file: &Path) {
    let dump = load_dump_or_exit(tested_file);
    for name in irchecker::list_passes(&dump) {
        println!("{}", name);
    }
}

pub fn cmd_dump_pass(tested_file: &Path, pass: &str) {
    let dump = load_dump_or_exit(tested_file);
    match irchecker::dump_pass(&dump, pass) {
        Ok(text) => print!("{}", text),
        Err(e) => fail(e),
    }
}
