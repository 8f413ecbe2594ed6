/*
    MartyPC
    https://github.com/dbalsom/martypc

    Copyright 2022-2025 Daniel Balsom

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    --------------------------------------------------------------------------
*/

use std::path::PathBuf;

#[cfg(feature = "use_bpaf")]
use bpaf::Bpaf;

#[cfg_attr(feature = "use_bpaf", derive(Bpaf))]
#[cfg_attr(feature = "use_bpaf", bpaf(options, version, generate(cli_args)))]
#[derive(Debug, Default)]
pub struct CmdLineArgs {
    #[cfg_attr(feature = "use_bpaf", bpaf(long("config_file"), long("configfile")))]
    pub config_file: Option<PathBuf>,

    // Media options
    #[cfg_attr(feature = "use_bpaf", bpaf(long))]
    pub d64: Option<PathBuf>,

    #[cfg_attr(feature = "use_bpaf", bpaf(long("write_protect"), switch))]
    pub write_protect: bool,

    // Emulator options
    #[cfg_attr(feature = "use_bpaf", bpaf(long("run_ms")))]
    pub run_ms: Option<u64>,

    #[cfg_attr(feature = "use_bpaf", bpaf(long("debug_keyboard"), switch))]
    pub debug_keyboard: bool,

    // Inspector options
    #[cfg_attr(feature = "use_bpaf", bpaf(long))]
    pub halftrack: Option<usize>,

    #[cfg_attr(feature = "use_bpaf", bpaf(long("mark_head"), switch))]
    pub mark_head: bool,

    // Keyboard options
    #[cfg_attr(feature = "use_bpaf", bpaf(long("keymap_file"), long("keymapfile")))]
    pub keymap_file: Option<PathBuf>,

    #[cfg_attr(feature = "use_bpaf", bpaf(long("reset_keymap"), switch))]
    pub reset_keymap: bool,

    #[cfg_attr(feature = "use_bpaf", bpaf(long))]
    pub autotype: Option<String>,
}

#[cfg(all(test, feature = "use_bpaf"))]
mod tests {
    use super::*;

    #[test]
    fn parses_flags() {
        let args = cli_args()
            .run_inner(bpaf::Args::from(&[
                "--d64",
                "disk.d64",
                "--run_ms",
                "500",
                "--halftrack",
                "2",
                "--reset_keymap",
                "--mark_head",
                "--autotype",
                "KeyA,Space",
            ]))
            .unwrap();
        assert_eq!(args.d64, Some(PathBuf::from("disk.d64")));
        assert_eq!(args.run_ms, Some(500));
        assert_eq!(args.halftrack, Some(2));
        assert!(args.reset_keymap);
        assert!(args.mark_head);
        assert_eq!(args.autotype.as_deref(), Some("KeyA,Space"));
        assert!(!args.write_protect);
        assert!(args.config_file.is_none());
    }
}
