// Dweve NCL - Nested Context Language document model
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! End-to-end tests: markup in, document checks, markup out.

use ncl_core::{ChildGroup, ParseOptions, Reference};
use ncl_xml::{from_ncl_reader, from_ncl_str, to_ncl, XmlError};
use std::fs::File;
use std::io::{BufReader, Write};

const PRESENTATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ncl id="presentation" title="Language &amp; subtitles" xmlns="http://www.ncl.org.br/NCL3.0/EDTVProfile">
  <head>
    <ruleBase>
      <rule id="rEn" var="system.language" comparator="eq" value="en"/>
      <rule id="rPt" var="system.language" comparator="eq" value="pt"/>
    </ruleBase>
    <descriptorBase>
      <descriptor id="dVideo" player="video" explicitDur="30s" region="screen"/>
      <descriptorSwitch id="dSubtitles">
        <bindRule constituent="dEn" rule="rEn"/>
        <defaultDescriptor descriptor="dEn"/>
        <descriptor id="dEn" region="bottom"/>
      </descriptorSwitch>
    </descriptorBase>
    <connectorBase>
      <causalConnector id="onBeginStart"/>
    </connectorBase>
  </head>
  <body>
    <port id="entry" component="video" interface="opening"/>
    <media id="video" src="video.mp4" descriptor="dVideo">
      <area id="opening" begin="0s" end="00:00:05"/>
      <area id="logo" coords="10,10,20%,20%" first="24f" last="48f"/>
    </media>
    <switch id="subtitles">
      <switchPort id="text">
        <mapping component="subEn"/>
        <mapping component="subPt"/>
      </switchPort>
      <bindRule constituent="subEn" rule="rEn"/>
      <bindRule constituent="subPt" rule="rPt"/>
      <defaultComponent component="subEn"/>
      <media id="subEn" src="en.srt"/>
      <media id="subPt" src="pt.srt"/>
    </switch>
    <link xconnector="onBeginStart">
      <linkParam name="delay" value="2s"/>
      <bind role="onBegin" component="video" interface="opening"/>
      <bind role="start" component="subtitles" interface="text"/>
    </link>
  </body>
</ncl>
"#;

fn parse(xml: &str) -> ncl_core::Document {
    from_ncl_str(xml, &ParseOptions::default()).unwrap()
}

#[test]
fn test_full_presentation_is_valid() {
    let doc = parse(PRESENTATION);
    let validation = doc.validate();
    assert!(validation.warnings.is_empty(), "{:?}", validation.warnings);
    assert!(validation.errors.is_empty(), "{:?}", validation.errors);
    assert!(validation.valid);
}

#[test]
fn test_full_presentation_references() {
    let doc = parse(PRESENTATION);
    let root = doc.root().unwrap();
    let body = doc.children_in(root, ChildGroup::Body).next().unwrap();
    let link = doc.children_in(body, ChildGroup::Links).next().unwrap();
    let subtitles = doc.find_child(body, ChildGroup::Nodes, "subtitles").unwrap();
    let text = doc.find_child(subtitles, ChildGroup::Ports, "text").unwrap();

    let start_bind = doc
        .children_in(link, ChildGroup::Binds)
        .find(|&b| doc.serialize(b, 0).contains("role='start'"))
        .unwrap();
    assert_eq!(
        doc[start_bind].reference(ncl_core::RefField::Interface),
        Some(&Reference::Resolved(text))
    );
}

#[test]
fn test_round_trip_is_byte_identical() {
    let first = to_ncl(&parse(PRESENTATION));
    let second = to_ncl(&parse(&first));
    assert_eq!(first, second);
}

#[test]
fn test_round_trip_keeps_unresolved_ids() {
    let xml = "<ncl id='doc'><body><switch id='sw' refer='elsewhere'>\
               <defaultComponent component='ghost'/></switch></body></ncl>";
    let doc = parse(xml);
    assert_eq!(doc.warnings(doc.root().unwrap()).len(), 2);

    let out = to_ncl(&doc);
    assert!(out.contains("refer='elsewhere'"));
    assert!(out.contains("<defaultComponent component='ghost'/>"));
    assert_eq!(to_ncl(&parse(&out)), out);
}

#[test]
fn test_serialization_escapes_values() {
    let doc = parse(PRESENTATION);
    let out = to_ncl(&doc);
    assert!(out.contains("title='Language &amp; subtitles'"));
}

#[test]
fn test_read_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(PRESENTATION.as_bytes()).unwrap();

    let reader = BufReader::new(File::open(file.path()).unwrap());
    let doc = from_ncl_reader(reader, &ParseOptions::default()).unwrap();
    assert_eq!(to_ncl(&doc), to_ncl(&parse(PRESENTATION)));
}

#[test]
fn test_limits_apply_through_reader() {
    let opts = ParseOptions::builder().max_depth(3).build();
    let err = from_ncl_str(PRESENTATION, &opts).unwrap_err();
    match err {
        XmlError::Model(e) => assert_eq!(e.kind, ncl_core::NclErrorKind::Security),
        other => panic!("expected security error, got {:?}", other),
    }
}
