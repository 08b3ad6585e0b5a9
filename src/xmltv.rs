//! XMLTV document serialization.
//!
//! Element order is a compatibility contract with downstream guide
//! consumers: every `<channel>` precedes every `<programme>`, and inside a
//! programme `<title>` precedes `<desc>`.

use std::io::Write;

use anyhow::{Context, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::localtime;
use crate::model::{Channel, Programme};
use crate::sanitize;

/// Render the full guide document. Programmes are written in the order
/// given; callers sort beforehand.
pub fn serialize(channels: &[Channel], programmes: &[Programme], generator: &str) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut tv = BytesStart::new("tv");
    tv.push_attribute(("generator-info-name", generator));
    writer.write_event(Event::Start(tv))?;

    for channel in channels {
        write_channel(&mut writer, channel)?;
    }
    for programme in programmes {
        write_programme(&mut writer, programme)?;
    }

    writer.write_event(Event::End(BytesEnd::new("tv")))?;
    String::from_utf8(writer.into_inner()).context("guide document was not valid utf-8")
}

fn write_channel<W: Write>(writer: &mut Writer<W>, channel: &Channel) -> Result<()> {
    let mut start = BytesStart::new("channel");
    start.push_attribute(("id", channel.id.as_str()));
    writer.write_event(Event::Start(start))?;

    write_text_element(writer, "display-name", &channel.name, None)?;
    if let Some(icon) = &channel.icon {
        let mut empty = BytesStart::new("icon");
        empty.push_attribute(("src", icon.as_str()));
        writer.write_event(Event::Empty(empty))?;
    }

    writer.write_event(Event::End(BytesEnd::new("channel")))?;
    Ok(())
}

fn write_programme<W: Write>(writer: &mut Writer<W>, programme: &Programme) -> Result<()> {
    let start_ts = localtime::format_xmltv(&programme.start);
    let stop_ts = localtime::format_xmltv(&programme.stop);

    let mut start = BytesStart::new("programme");
    start.push_attribute(("start", start_ts.as_str()));
    start.push_attribute(("stop", stop_ts.as_str()));
    start.push_attribute(("channel", programme.channel_id.as_str()));
    writer.write_event(Event::Start(start))?;

    // <title> is always present, even when the text is empty.
    write_text_element(writer, "title", &programme.title, Some(&programme.language))?;
    if let Some(desc) = &programme.description {
        write_text_element(writer, "desc", desc, Some(&programme.language))?;
    }

    writer.write_event(Event::End(BytesEnd::new("programme")))?;
    Ok(())
}

fn write_text_element<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: &str,
    lang: Option<&str>,
) -> Result<()> {
    let mut start = BytesStart::new(name);
    if let Some(lang) = lang {
        start.push_attribute(("lang", lang));
    }
    writer.write_event(Event::Start(start))?;
    writer.write_event(Event::Text(BytesText::from_escaped(sanitize::escape_xml(text))))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}
