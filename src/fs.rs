//! # Abstracción de filesystem
//! src/fs.rs
//!
//! Los handlers estáticos solo necesitan cuatro cosas del filesystem:
//! saber si un archivo existe, su tamaño, su fecha de modificación y poder
//! leerlo. Todo se direcciona con paths tipo `/www/index.html`.

use std::fs::File;
use std::io::{self, Read, Seek};
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

/// Fuente de bytes que se puede leer y rebobinar
pub trait FileSource: Read + Seek + Send {}

impl<T: Read + Seek + Send> FileSource for T {}

/// Metadatos de un archivo regular
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMeta {
    pub size: u64,
    pub modified: Option<SystemTime>,
}

/// Filesystem de donde se sirven los recursos estáticos
pub trait FileSystem: Send + Sync {
    /// Metadatos del archivo, o `None` si no existe o no es un archivo
    fn metadata(&self, path: &str) -> Option<FileMeta>;

    /// Abre el archivo para lectura
    fn open(&self, path: &str) -> io::Result<Box<dyn FileSource>>;

    fn exists(&self, path: &str) -> bool {
        self.metadata(path).is_some()
    }
}

/// Filesystem respaldado por un directorio del disco
#[derive(Debug, Clone)]
pub struct DiskFs {
    root: PathBuf,
}

impl DiskFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Traduce un path `/a/b.txt` a `<root>/a/b.txt`.
    ///
    /// Retorna `None` si el path intenta salir del root.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        let mut resolved = self.root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(resolved)
    }
}

impl FileSystem for DiskFs {
    fn metadata(&self, path: &str) -> Option<FileMeta> {
        let full = self.resolve(path)?;
        let meta = std::fs::metadata(full).ok()?;
        if !meta.is_file() {
            return None;
        }
        Some(FileMeta {
            size: meta.len(),
            modified: meta.modified().ok(),
        })
    }

    fn open(&self, path: &str) -> io::Result<Box<dyn FileSource>> {
        let full = self.resolve(path).ok_or_else(|| {
            io::Error::new(io::ErrorKind::PermissionDenied, "path escapes root")
        })?;
        Ok(Box::new(File::open(full)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_metadata_and_open() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("www")).unwrap();
        std::fs::write(dir.path().join("www/a.txt"), b"hola").unwrap();

        let fs = DiskFs::new(dir.path());
        let meta = fs.metadata("/www/a.txt").unwrap();
        assert_eq!(meta.size, 4);
        assert!(meta.modified.is_some());

        let mut content = String::new();
        fs.open("/www/a.txt").unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "hola");
    }

    #[test]
    fn test_directories_are_not_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("www")).unwrap();

        let fs = DiskFs::new(dir.path());
        assert!(!fs.exists("/www"));
        assert!(!fs.exists("/missing.txt"));
    }

    #[test]
    fn test_parent_components_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let fs = DiskFs::new(dir.path().join("www"));

        assert!(fs.metadata("/../secret").is_none());
        assert!(fs.open("/a/../../secret").is_err());
    }
}
