//! Comma-separated tables with a header row.
//!
//! Header cells are matched case-insensitively by substring to assign column
//! roles; the first matching header wins each role. Rows are split on every
//! comma with no quote handling, so a quoted field containing a comma shifts
//! the following columns.

use crate::{
    DEFAULT_ENDPOINT, DEFAULT_PROTOCOL, DetailValue, Details, Format, PacketRecord, ParseResult,
};

use super::{integer_prefix, payload_lines};

const SOURCE_KEYWORDS: &[&str] = &["source", "src"];
const DESTINATION_KEYWORDS: &[&str] = &["destination", "dst"];
const PROTOCOL_KEYWORDS: &[&str] = &["protocol"];
const LENGTH_KEYWORDS: &[&str] = &["length", "size"];
const INFO_KEYWORDS: &[&str] = &["info", "description"];

/// Column index per record field, when a header claims it.
#[derive(Debug, Default, PartialEq, Eq)]
struct ColumnRoles {
    source: Option<usize>,
    destination: Option<usize>,
    protocol: Option<usize>,
    length: Option<usize>,
    info: Option<usize>,
}

impl ColumnRoles {
    fn from_headers(headers: &[String]) -> Self {
        Self {
            source: find_column(headers, SOURCE_KEYWORDS),
            destination: find_column(headers, DESTINATION_KEYWORDS),
            protocol: find_column(headers, PROTOCOL_KEYWORDS),
            length: find_column(headers, LENGTH_KEYWORDS),
            info: find_column(headers, INFO_KEYWORDS),
        }
    }
}

fn find_column(headers: &[String], keywords: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|header| keywords.iter().any(|keyword| header.contains(keyword)))
}

pub fn parse_csv(content: &str) -> ParseResult {
    let mut lines = payload_lines(content);
    let Some(header_line) = lines.next() else {
        return ParseResult::new(Format::Csv, Vec::new());
    };

    let headers: Vec<String> = header_line
        .split(',')
        .map(|header| header.trim().to_lowercase())
        .collect();
    let roles = ColumnRoles::from_headers(&headers);
    let packets = lines.map(|row| parse_row(row, &headers, &roles)).collect();

    ParseResult::new(Format::Csv, packets)
}

fn parse_row(row: &str, headers: &[String], roles: &ColumnRoles) -> PacketRecord {
    let cells: Vec<&str> = row.split(',').collect();
    let cell = |column: Option<usize>| {
        column
            .and_then(|index| cells.get(index))
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    };

    let details: Details = headers
        .iter()
        .zip(&cells)
        .filter_map(|(header, value)| {
            let value = value.trim();
            (!value.is_empty()).then(|| (header.clone(), DetailValue::from(value)))
        })
        .collect();

    PacketRecord {
        protocol: cell(roles.protocol).unwrap_or(DEFAULT_PROTOCOL).to_string(),
        source: cell(roles.source).unwrap_or(DEFAULT_ENDPOINT).to_string(),
        destination: cell(roles.destination).unwrap_or(DEFAULT_ENDPOINT).to_string(),
        length: cell(roles.length).map_or(0, integer_prefix),
        info: cell(roles.info).unwrap_or_default().to_string(),
        timestamp: None,
        details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(line: &str) -> Vec<String> {
        line.split(',').map(|h| h.trim().to_lowercase()).collect()
    }

    #[test]
    fn parses_single_row_with_all_roles() {
        let result = parse_csv("source,destination,protocol,length,info\n1.1.1.1,2.2.2.2,TCP,60,hello");
        assert_eq!(result.format(), Format::Csv);
        assert_eq!(result.total_packets(), 1);

        let packet = &result.packets()[0];
        assert_eq!(packet.source, "1.1.1.1");
        assert_eq!(packet.destination, "2.2.2.2");
        assert_eq!(packet.protocol, "TCP");
        assert_eq!(packet.length, 60);
        assert_eq!(packet.info, "hello");
        assert_eq!(packet.timestamp, None);
    }

    #[test]
    fn roles_match_by_substring_and_first_header_wins() {
        let roles = ColumnRoles::from_headers(&headers(
            "No.,Src Addr,Source Port,Dst Addr,Frame Size,Description,Protocol",
        ));
        assert_eq!(
            roles,
            ColumnRoles {
                source: Some(1),
                destination: Some(3),
                protocol: Some(6),
                length: Some(4),
                info: Some(5),
            }
        );
    }

    #[test]
    fn details_keep_every_column_by_lowercased_header() {
        let result = parse_csv("Time,Source,Destination,TTL\n0.001, 10.0.0.1 ,10.0.0.2,64");
        let details = &result.packets()[0].details;
        let keys: Vec<&str> = details.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["time", "source", "destination", "ttl"]);
        assert_eq!(details["source"].as_str(), Some("10.0.0.1"));
        assert_eq!(details["ttl"].as_str(), Some("64"));
    }

    #[test]
    fn missing_and_empty_cells_use_defaults() {
        let result = parse_csv("source,destination,protocol,length,info\n1.1.1.1,,,abc");
        let packet = &result.packets()[0];
        assert_eq!(packet.destination, "Unknown");
        assert_eq!(packet.protocol, "Unknown");
        assert_eq!(packet.length, 0);
        assert_eq!(packet.info, "");
        assert_eq!(packet.details.len(), 2);
    }

    #[test]
    fn length_reads_leading_integer() {
        let result = parse_csv("source,length\n1.1.1.1,74 bytes\n2.2.2.2,60.0\n3.3.3.3,n/a");
        let lengths: Vec<u64> = result.packets().iter().map(|p| p.length).collect();
        assert_eq!(lengths, vec![74, 60, 0]);
    }

    #[test]
    fn unmapped_roles_use_defaults() {
        let result = parse_csv("source,ttl\n1.1.1.1,64");
        let packet = &result.packets()[0];
        assert_eq!(packet.source, "1.1.1.1");
        assert_eq!(packet.destination, "Unknown");
        assert_eq!(packet.length, 0);
    }

    #[test]
    fn quoted_commas_shift_columns() {
        let result = parse_csv("source,info,protocol\n1.1.1.1,\"a, b\",TCP");
        let packet = &result.packets()[0];
        assert_eq!(packet.info, "\"a");
        assert_eq!(packet.protocol, "b\"");
    }

    #[test]
    fn header_only_and_empty_input_yield_no_packets() {
        assert_eq!(parse_csv("source,destination").total_packets(), 0);
        assert_eq!(parse_csv("").total_packets(), 0);
    }
}
