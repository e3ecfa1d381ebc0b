use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

/// Read-only memory map of a large EAD file.
pub struct MmapFileReader {
    _file: File,
    mmap: Mmap,
}

impl MmapFileReader {
    pub fn new(file_path: &Path) -> std::io::Result<Self> {
        let file = File::open(file_path)?;
        // the file is opened read-only and the map does not outlive it
        let mmap = unsafe { Mmap::map(&file)? };

        Ok(MmapFileReader { _file: file, mmap })
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.mmap
    }

    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_maps_file_contents() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"<ead></ead>").unwrap();
        let reader = MmapFileReader::new(file.path()).unwrap();
        assert_eq!(reader.as_slice(), b"<ead></ead>");
        assert_eq!(reader.len(), 11);
        assert!(!reader.is_empty());
    }
}
