//! Call-out to the external `4ti2-zsolve` lattice-basis tool.
//!
//! The oracle consumes four whitespace text files (`.mat`, `.rel`,
//! `.sign`, `.rhs`, each headed by `rows cols`) and produces a
//! homogeneous and an inhomogeneous basis (`.zhom` / `.zinhom`). All
//! files live in a scratch [`tempfile::TempDir`], so they are removed on
//! every exit path, including oracle failure.

use crate::error::{SolveError, SolveResult};
use std::fs;
use std::path::Path;
use std::process::Command;
use tracing::debug;

const ZSOLVE_BINARY: &str = "4ti2-zsolve";

/// Computes the Hilbert basis of `{x ≥ 0 : Ax ≥ 0}` for the given
/// coefficient matrix; with `quantity_caps`, identity rows cap each
/// coordinate (`x ≤ cap`) and the basis becomes inhomogeneous.
///
/// Returns one basis vector per row of the result.
pub(crate) fn hilbert_basis(
    matrix: &[Vec<i64>],
    quantity_caps: Option<&[i64]>,
    quiet: bool,
) -> SolveResult<Vec<Vec<i64>>> {
    let columns = matrix.first().map(Vec::len).unwrap_or(0);
    let scratch = tempfile::tempdir()?;
    let prefix = scratch.path().join("tbn_zsolve");

    write_oracle_inputs(&prefix, matrix, columns, quantity_caps)?;

    let binary = which::which(ZSOLVE_BINARY).map_err(|_| {
        SolveError::OracleUnavailable(format!("'{ZSOLVE_BINARY}' was not found on the PATH"))
    })?;
    let mut command = Command::new(binary);
    command.arg(&prefix);
    if quiet {
        command.arg("-q");
    }
    debug!(?command, "invoking lattice-basis oracle");
    let output = command
        .output()
        .map_err(|err| SolveError::OracleUnavailable(format!("failed to run {ZSOLVE_BINARY}: {err}")))?;
    if !output.status.success() {
        return Err(SolveError::OracleUnavailable(format!(
            "{ZSOLVE_BINARY} exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    let homogeneous = read_basis_file(&prefix.with_extension("zhom"))?;
    let mut inhomogeneous = read_basis_file(&prefix.with_extension("zinhom"))?;
    inhomogeneous.retain(|vector| vector.iter().any(|&entry| entry != 0));

    let mut basis = homogeneous;
    basis.extend(inhomogeneous);
    if basis.is_empty() {
        return Err(SolveError::Solver(
            "the lattice-basis oracle did not generate any basis vectors".into(),
        ));
    }
    debug!(vectors = basis.len(), "oracle returned basis");
    Ok(basis)
}

fn write_oracle_inputs(
    prefix: &Path,
    matrix: &[Vec<i64>],
    columns: usize,
    quantity_caps: Option<&[i64]>,
) -> SolveResult<()> {
    let extra_rows = if quantity_caps.is_some() { columns } else { 0 };
    let rows = matrix.len() + extra_rows;

    // coefficient matrix, with identity rows appended for capped runs
    let mut mat = format!("{rows} {columns}\n");
    for row in matrix {
        push_row(&mut mat, row);
    }
    if quantity_caps.is_some() {
        for i in 0..columns {
            let identity: Vec<i64> = (0..columns).map(|j| i64::from(i == j)).collect();
            push_row(&mut mat, &identity);
        }
    }
    fs::write(prefix.with_extension("mat"), mat)?;

    // domain rows are lower bounds, cap rows are upper bounds
    let mut rel = format!("1 {rows}\n");
    rel.push_str(&vec![">"; matrix.len()].join(" "));
    if extra_rows > 0 {
        rel.push(' ');
        rel.push_str(&vec!["<"; extra_rows].join(" "));
    }
    rel.push('\n');
    fs::write(prefix.with_extension("rel"), rel)?;

    // every coordinate is non-negative
    let mut sign = format!("1 {columns}\n");
    sign.push_str(&vec!["1"; columns].join(" "));
    sign.push('\n');
    fs::write(prefix.with_extension("sign"), sign)?;

    // zero right-hand sides for domains, monomer counts for caps
    let mut rhs = format!("1 {rows}\n");
    rhs.push_str(&vec!["0"; matrix.len()].join(" "));
    if let Some(caps) = quantity_caps {
        for cap in caps {
            rhs.push_str(&format!(" {cap}"));
        }
    }
    rhs.push('\n');
    fs::write(prefix.with_extension("rhs"), rhs)?;

    Ok(())
}

fn push_row(buffer: &mut String, row: &[i64]) {
    for entry in row {
        buffer.push_str(&format!("{entry} "));
    }
    buffer.push('\n');
}

/// Reads a `rows cols` header followed by whitespace-separated integers.
fn read_basis_file(path: &Path) -> SolveResult<Vec<Vec<i64>>> {
    let text = fs::read_to_string(path).map_err(|err| {
        SolveError::OracleUnavailable(format!(
            "oracle output {} could not be read: {err}",
            path.display()
        ))
    })?;
    let mut numbers = text.split_whitespace().map(|token| {
        token.parse::<i64>().map_err(|_| {
            SolveError::OracleUnavailable(format!(
                "oracle output {} contained a non-integer token '{token}'",
                path.display()
            ))
        })
    });

    let rows = numbers.next().transpose()?.unwrap_or(0) as usize;
    let columns = numbers.next().transpose()?.unwrap_or(0) as usize;
    let mut basis = Vec::with_capacity(rows);
    for _ in 0..rows {
        let mut vector = Vec::with_capacity(columns);
        for _ in 0..columns {
            let entry = numbers.next().transpose()?.ok_or_else(|| {
                SolveError::OracleUnavailable(format!(
                    "oracle output {} ended before its declared shape",
                    path.display()
                ))
            })?;
            vector.push(entry);
        }
        basis.push(vector);
    }
    Ok(basis)
}
