//! 파일 증분 리더
//!
//! 저장된 오프셋부터 파일 끝까지 라인 단위로 읽습니다.
//! 메타데이터는 열린 핸들에서 얻으므로(fstat) 열기와 stat 사이에
//! 로테이션이 일어나도 크기와 inode가 실제로 읽는 파일과 일치합니다.
//!
//! # 라인 규칙
//! - `\n`으로 구분하며, 끝의 `\n` 또는 `\r\n`은 제거됩니다.
//! - 마지막 줄에 개행이 없어도 EOF까지 한 라인으로 소비합니다.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;
use std::time::SystemTime;

/// 열린 파일의 메타데이터 스냅샷
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMeta {
    /// 열 때의 파일 크기
    pub size: u64,
    /// inode 번호 (Unix 전용)
    pub inode: Option<u64>,
    /// 마지막 수정 시각
    pub modified: SystemTime,
}

impl FileMeta {
    /// std 메타데이터에서 스냅샷을 만듭니다.
    pub fn from_metadata(meta: &std::fs::Metadata) -> io::Result<Self> {
        Ok(Self {
            size: meta.len(),
            inode: inode_of(meta),
            modified: meta.modified()?,
        })
    }

    /// 경로를 stat하여 스냅샷을 만듭니다.
    pub fn of(path: &Path) -> io::Result<Self> {
        Self::from_metadata(&std::fs::metadata(path)?)
    }
}

#[cfg(unix)]
fn inode_of(meta: &std::fs::Metadata) -> Option<u64> {
    use std::os::unix::fs::MetadataExt;
    Some(meta.ino())
}

#[cfg(not(unix))]
fn inode_of(_meta: &std::fs::Metadata) -> Option<u64> {
    None
}

/// 오프셋 기반 라인 리더
#[derive(Debug)]
pub struct TailReader {
    reader: BufReader<File>,
    meta: FileMeta,
    offset: u64,
}

impl TailReader {
    /// 파일을 열고 메타데이터를 고정합니다.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        let meta = FileMeta::from_metadata(&file.metadata()?)?;
        Ok(Self {
            reader: BufReader::new(file),
            meta,
            offset: 0,
        })
    }

    /// 열 때의 메타데이터
    pub fn meta(&self) -> &FileMeta {
        &self.meta
    }

    /// 다음에 읽을 바이트 오프셋
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// 읽기 위치를 옮깁니다.
    pub fn seek_to(&mut self, offset: u64) -> io::Result<()> {
        self.reader.seek(SeekFrom::Start(offset))?;
        self.offset = offset;
        Ok(())
    }

    /// 다음 라인을 `buf`에 읽습니다 (개행 제외).
    ///
    /// EOF면 `false`를 반환합니다.
    pub fn next_line(&mut self, buf: &mut Vec<u8>) -> io::Result<bool> {
        buf.clear();
        let read = self.reader.read_until(b'\n', buf)?;
        if read == 0 {
            return Ok(false);
        }
        self.offset += read as u64;

        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }
        Ok(true)
    }
}
