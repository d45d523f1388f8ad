// darshan-report - summary reports for Darshan I/O traces
// Copyright (C) 2025  Maxim Petrov
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Two column HTML tables: a header cell and a value cell per row, no column header.

use std::fmt::Write;

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render `(label, value)` rows as an HTML table.
pub fn table<K, V>(rows: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut html = String::from("<table border=\"0\" class=\"dataframe\">\n  <tbody>\n");
    for (label, value) in rows {
        // writing into a String cannot fail
        let _ = write!(
            html,
            "    <tr>\n      <th>{}</th>\n      <td>{}</td>\n    </tr>\n",
            escape_html(label.as_ref()),
            escape_html(value.as_ref())
        );
    }
    html.push_str("  </tbody>\n</table>");
    html
}

#[cfg(test)]
mod test {
    use indoc::indoc;

    use super::{escape_html, table};

    #[test]
    fn escape_special_chars() {
        assert_eq!(
            escape_html("a.out < in.txt > \"out\" & done"),
            "a.out &lt; in.txt &gt; &quot;out&quot; &amp; done"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn empty_table() {
        let rows: [(&str, &str); 0] = [];
        assert_eq!(
            table(&rows),
            "<table border=\"0\" class=\"dataframe\">\n  <tbody>\n  </tbody>\n</table>"
        );
    }

    #[test]
    fn two_rows() {
        let rows = [("POSIX (ver=4)", "2.94 KiB"), ("STDIO (ver=1)", "0.07 KiB")];
        let expected = indoc! {r#"
            <table border="0" class="dataframe">
              <tbody>
                <tr>
                  <th>POSIX (ver=4)</th>
                  <td>2.94 KiB</td>
                </tr>
                <tr>
                  <th>STDIO (ver=1)</th>
                  <td>0.07 KiB</td>
                </tr>
              </tbody>
            </table>"#};
        assert_eq!(table(&rows), expected);
    }

    #[test]
    fn cells_are_escaped() {
        let rows = [("# Processes", "<16>")];
        assert!(table(&rows).contains("<td>&lt;16&gt;</td>"));
    }
}
