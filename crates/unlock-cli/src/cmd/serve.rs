use anyhow::Result;
use std::path::Path;

pub fn run(root: &Path, port: u16, speedup: u64) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    let root_buf = root.to_path_buf();
    rt.block_on(unlock_server::serve(root_buf, port, speedup))
}
