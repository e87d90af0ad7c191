use lzw_rs::cli::{self, Mode};

fn main() -> anyhow::Result<()> {
    cli::run(Mode::Encode)
}
