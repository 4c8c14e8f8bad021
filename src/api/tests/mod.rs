mod check;
mod passes;

use std::fs;
use std::path::Path;

pub(super) const DUMP: &str = "\
begin_compilation
  method \"Main.foo()\"
end_compilation
begin_cfg
  name \"gvn (before)\"
  i1 Add [i2,i3]
  i4 Add [i2,i3]
  i5 Return [i4]
end_cfg
begin_cfg
  name \"gvn (after)\"
  i1 Add [i2,i3]
  i5 Return [i1]
end_cfg
";

pub(super) fn write(dir: &Path, relative: &str, content: &str) {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}
