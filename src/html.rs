// econetctl - CLI for the ecoNET24 boiler controller service
// Copyright (C) 2024 Mathias Uhl <mathiasuhl@gmx.de>
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

//! Form field lookup in server-rendered pages.

use scraper::{Html, Selector};

/// Returns the `value` attribute of the first `<input>` whose `name` is
/// `field`. A field without a value attribute reads as an empty string.
pub fn form_field_value(document: &str, field: &str) -> Option<String> {
    let inputs = Selector::parse("input").ok()?;
    let html = Html::parse_document(document);
    html.select(&inputs)
        .find(|input| input.value().attr("name") == Some(field))
        .map(|input| input.value().attr("value").unwrap_or_default().to_string())
}
