//! Line-oriented text format for a whole world.
//!
//! ```text
//! <N>                 number of block names
//! <name_0> .. <name_N-1>
//! <size_x>
//! <size_y>
//! <size_z>
//! <size_x * size_y rows of size_z tokens, z fastest; -1 = empty>
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, Lines, Write};
use std::path::Path;

use super::error::{atomic_write, corrupted_line, PersistenceResult};
use crate::constants::persistence::EMPTY_CELL;
use crate::error::EngineError;
use crate::world::{BlockTypeId, VoxelGrid, VoxelPos};

/// Block names and grid as stored on disk
#[derive(Debug, Clone, PartialEq)]
pub struct WorldSnapshot {
    pub block_names: Vec<String>,
    pub grid: VoxelGrid,
}

/// Serialize `grid` and `block_names` in world file format
pub fn write_world<W: Write>(
    writer: &mut W,
    block_names: &[String],
    grid: &VoxelGrid,
) -> PersistenceResult<()> {
    writeln!(writer, "{}", block_names.len())?;
    for name in block_names {
        writeln!(writer, "{}", name)?;
    }

    let [sx, sy, sz] = grid.size();
    writeln!(writer, "{}", sx)?;
    writeln!(writer, "{}", sy)?;
    writeln!(writer, "{}", sz)?;

    let mut row = String::new();
    for x in 0..sx as i32 {
        for y in 0..sy as i32 {
            row.clear();
            for z in 0..sz as i32 {
                if z > 0 {
                    row.push(' ');
                }
                let token = grid
                    .get(VoxelPos::new(x, y, z))
                    .map_or(EMPTY_CELL, |block| block.0 as i32);
                row.push_str(&token.to_string());
            }
            writeln!(writer, "{}", row)?;
        }
    }
    Ok(())
}

/// Parse a world file.
///
/// The grid is rounded up to whole clusters of `cluster_dims`; cells beyond the
/// stored size stay empty. Any structural fault fails the whole read.
pub fn read_world<R: BufRead>(reader: R, cluster_dims: [u32; 3]) -> PersistenceResult<WorldSnapshot> {
    let mut lines = LineReader::new(reader);

    let (line, count) = lines.next_line("block name count")?;
    let name_count: usize = parse_token(line, count.trim(), "block name count")?;
    if name_count > u16::MAX as usize + 1 {
        return Err(corrupted_line(
            line,
            format!("{} block names exceed the supported maximum", name_count),
        ));
    }

    let mut block_names = Vec::with_capacity(name_count);
    for _ in 0..name_count {
        let (_, name) = lines.next_line("block name")?;
        block_names.push(name.trim_end().to_string());
    }

    let mut size = [0u32; 3];
    let mut size_line = 0;
    for (axis, label) in size.iter_mut().zip(["size x", "size y", "size z"]) {
        let (line, text) = lines.next_line(label)?;
        *axis = parse_token(line, text.trim(), label)?;
        size_line = line;
    }

    let mut grid = VoxelGrid::new(size, cluster_dims).map_err(|err| match err {
        EngineError::GridTooLarge { .. } => corrupted_line(size_line, err.to_string()),
        other => other,
    })?;
    let [sx, sy, sz] = size;
    for x in 0..sx as i32 {
        for y in 0..sy as i32 {
            let (line, row) = lines.next_line("grid row")?;
            let tokens: Vec<&str> = row.split_whitespace().collect();
            if tokens.len() != sz as usize {
                return Err(corrupted_line(
                    line,
                    format!("expected {} tokens, found {}", sz, tokens.len()),
                ));
            }

            for (z, token) in tokens.into_iter().enumerate() {
                let value: i32 = parse_token(line, token, "cell value")?;
                let cell = match value {
                    EMPTY_CELL => None,
                    v if v >= 0 && (v as usize) < name_count => Some(BlockTypeId(v as u16)),
                    v => {
                        return Err(corrupted_line(
                            line,
                            format!("block type {} out of range for {} block names", v, name_count),
                        ))
                    }
                };
                grid.set(VoxelPos::new(x, y, z as i32), cell);
            }
        }
    }

    Ok(WorldSnapshot { block_names, grid })
}

/// Atomically write a world file to `path`
pub fn save_world(path: &Path, block_names: &[String], grid: &VoxelGrid) -> PersistenceResult<()> {
    let mut buffer = Vec::new();
    write_world(&mut buffer, block_names, grid)?;
    atomic_write(path, &buffer)
}

pub fn load_world(path: &Path, cluster_dims: [u32; 3]) -> PersistenceResult<WorldSnapshot> {
    let file = File::open(path)?;
    read_world(BufReader::new(file), cluster_dims)
}

fn parse_token<T: std::str::FromStr>(line: usize, token: &str, what: &str) -> PersistenceResult<T> {
    token
        .parse()
        .map_err(|_| corrupted_line(line, format!("invalid {}: {:?}", what, token)))
}

/// Lines with 1-based numbers for error reporting
struct LineReader<R> {
    lines: Lines<R>,
    line: usize,
}

impl<R: BufRead> LineReader<R> {
    fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
        }
    }

    fn next_line(&mut self, expected: &str) -> PersistenceResult<(usize, String)> {
        self.line += 1;
        match self.lines.next() {
            Some(text) => Ok((self.line, text?)),
            None => Err(corrupted_line(
                self.line,
                format!("unexpected end of file, expected {}", expected),
            )),
        }
    }
}
