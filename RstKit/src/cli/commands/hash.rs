//! CLI command for hashing entry names

use crate::formats::rst::RstVersion;

/// Print the key of `text` under one layout, or under every layout
pub fn execute(text: &str, version: Option<RstVersion>) -> anyhow::Result<()> {
    if text.is_empty() {
        anyhow::bail!("Entry name must not be empty");
    }

    match version {
        Some(version) => println!("{:x}", version.hash_algorithm().hash(text)),
        None => {
            for version in RstVersion::ALL {
                println!("{}", format_row(version, text));
            }
        }
    }

    Ok(())
}

/// One `version  algorithm  key` line with fixed-width columns
fn format_row(version: RstVersion, text: &str) -> String {
    let algorithm = version.hash_algorithm();
    format!(
        "{:<14} {:<20} {:x}",
        version.as_str(),
        algorithm.to_string(),
        algorithm.hash(text)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_are_aligned() {
        let rows: Vec<String> = RstVersion::ALL
            .into_iter()
            .map(|version| format_row(version, "hello"))
            .collect();

        let key_columns: Vec<usize> = rows
            .iter()
            .map(|row| row.rfind(' ').unwrap())
            .collect();
        let aligned = key_columns.iter().all(|&column| column == key_columns[0]);
        assert!(aligned, "{rows:#?}");
        assert!(rows[5].ends_with(" 155c62dcfd"));
    }
}
