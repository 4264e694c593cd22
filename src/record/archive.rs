use anyhow::{Context, Result, bail};
use flate2::Compression;
use flate2::write::GzEncoder;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Read;
use std::path::Path;

/// Hex-encoded SHA-256 of the file at `path`.
///
/// # Errors
/// Returns an error if the file cannot be opened or read.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut f = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = f.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Write `src` as a gzipped tarball to `dst`, rooted at `src`'s directory name.
///
/// `.git` is skipped. The archive is built in a temp file next to `dst` and
/// renamed into place, so readers never see a partial archive.
pub fn write_tarball(src: &Path, dst: &Path) -> Result<()> {
    if !src.is_dir() {
        bail!("not a directory: {}", src.display());
    }
    let root = src
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "source".into());
    let parent = dst.parent().unwrap_or_else(|| Path::new("."));

    let tmp = tempfile::Builder::new()
        .suffix(".tar.gz.tmp")
        .tempfile_in(parent)?;
    {
        let gz = GzEncoder::new(tmp.as_file(), Compression::default());
        let mut ar = tar::Builder::new(gz);
        ar.follow_symlinks(false);
        append_dir(&mut ar, src, Path::new(&root))?;
        ar.into_inner()?.finish()?;
    }
    tmp.persist(dst)
        .with_context(|| format!("write {}", dst.display()))?;
    Ok(())
}

fn append_dir<W: std::io::Write>(ar: &mut tar::Builder<W>, dir: &Path, name: &Path) -> Result<()> {
    ar.append_dir(name, dir)?;
    let mut children: Vec<_> = fs::read_dir(dir)?.flatten().collect();
    children.sort_by_key(|e| e.file_name());
    for ent in children {
        let file_name = ent.file_name();
        if file_name == ".git" {
            continue;
        }
        let path = ent.path();
        let entry_name = name.join(&file_name);
        let ft = ent.file_type()?;
        if ft.is_dir() {
            append_dir(ar, &path, &entry_name)?;
        } else {
            ar.append_path_with_name(&path, &entry_name)
                .with_context(|| format!("archive {}", path.display()))?;
        }
    }
    Ok(())
}
