//! End-to-end validation scenarios: schema text in, violations out.

use xsdvalid::validators::codes;
use xsdvalid::{Schema, Validator, XmlDocument};

fn validate(schema_xml: &str, doc_xml: &str) -> Vec<xsdvalid::Violation> {
    let schema = Schema::from_str(schema_xml).expect("schema should compile");
    let doc = XmlDocument::parse(doc_xml).expect("document should parse");
    Validator::new(&schema).validate(&doc)
}

#[test]
fn sequence_order_and_occurrence() {
    let schema = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
      <xs:element name="root">
        <xs:complexType>
          <xs:sequence>
            <xs:element name="A" type="xs:string"/>
            <xs:element name="B" type="xs:string" minOccurs="0" maxOccurs="unbounded"/>
          </xs:sequence>
        </xs:complexType>
      </xs:element>
    </xs:schema>"#;

    assert!(validate(schema, "<root><A/><B/><B/></root>").is_empty());

    let violations = validate(schema, "<root><B/><A/></root>");
    let unexpected: Vec<_> = violations
        .iter()
        .filter(|v| v.code == codes::CVC_COMPLEX_TYPE_2_4_D)
        .collect();
    assert_eq!(unexpected.len(), 1);
    assert_eq!(unexpected[0].element.as_ref().unwrap().local, "B");
}

#[test]
fn union_and_list_types() {
    let schema = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
      <xs:simpleType name="intOrString">
        <xs:union memberTypes="xs:integer xs:string"/>
      </xs:simpleType>
      <xs:simpleType name="integerList">
        <xs:list itemType="xs:integer"/>
      </xs:simpleType>
      <xs:element name="value" type="intOrString"/>
      <xs:element name="numbers" type="integerList"/>
    </xs:schema>"#;

    assert!(validate(schema, "<value>42</value>").is_empty());
    assert!(validate(schema, "<value>hello</value>").is_empty());

    assert!(validate(schema, "<numbers>1 2 3</numbers>").is_empty());
    let violations = validate(schema, "<numbers>1 2 3 abc 4</numbers>");
    assert_eq!(violations.len(), 1);
    assert!(
        violations[0].message.contains("list item 4"),
        "message should name the offending item: {}",
        violations[0].message
    );
}

const VEHICLE_SCHEMA: &str = r#"<?xml version="1.0"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
           targetNamespace="http://example.com/vehicle"
           xmlns:v="http://example.com/vehicle"
           elementFormDefault="qualified">
  <xs:element name="vehicle" type="v:VehicleType"/>
  <xs:element name="car" type="v:CarType" substitutionGroup="v:vehicle"/>
  <xs:element name="motorcycle" type="v:MotorcycleType" substitutionGroup="v:vehicle"/>
  <xs:complexType name="VehicleType">
    <xs:sequence>
      <xs:element name="brand" type="xs:string"/>
      <xs:element name="year" type="xs:int"/>
    </xs:sequence>
  </xs:complexType>
  <xs:complexType name="CarType">
    <xs:complexContent>
      <xs:extension base="v:VehicleType">
        <xs:sequence>
          <xs:element name="doors" type="xs:int"/>
        </xs:sequence>
      </xs:extension>
    </xs:complexContent>
  </xs:complexType>
  <xs:complexType name="MotorcycleType">
    <xs:sequence>
      <xs:element name="engineCC" type="xs:int"/>
    </xs:sequence>
  </xs:complexType>
  <xs:element name="fleet">
    <xs:complexType>
      <xs:sequence>
        <xs:element ref="v:vehicle" maxOccurs="unbounded"/>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
</xs:schema>"#;

#[test]
fn substitution_group_with_compatible_type() {
    let doc = r#"<fleet xmlns="http://example.com/vehicle">
      <car>
        <brand>T</brand>
        <year>2022</year>
        <doors>4</doors>
      </car>
    </fleet>"#;
    let violations = validate(VEHICLE_SCHEMA, doc);
    assert!(violations.is_empty(), "unexpected: {:?}", violations);
}

#[test]
fn substitution_group_head_still_matches() {
    let doc = r#"<fleet xmlns="http://example.com/vehicle">
      <vehicle><brand>G</brand><year>2020</year></vehicle>
    </fleet>"#;
    assert!(validate(VEHICLE_SCHEMA, doc).is_empty());
}

#[test]
fn substitution_group_incompatible_type_rejected() {
    // MotorcycleType does not derive from VehicleType, so the registry
    // membership alone must not admit the element.
    let doc = r#"<fleet xmlns="http://example.com/vehicle">
      <motorcycle><engineCC>650</engineCC></motorcycle>
    </fleet>"#;
    let violations = validate(VEHICLE_SCHEMA, doc);
    assert!(
        violations
            .iter()
            .any(|v| v.code == codes::CVC_COMPLEX_TYPE_2_4_D),
        "expected an unexpected-element violation, got {:?}",
        violations
    );
}

#[test]
fn wildcard_namespace_constraint() {
    let schema = r###"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
        targetNamespace="urn:container" xmlns:c="urn:container"
        elementFormDefault="qualified">
      <xs:element name="container">
        <xs:complexType>
          <xs:sequence>
            <xs:element name="header" type="xs:string"/>
            <xs:any namespace="##other" minOccurs="0" maxOccurs="unbounded" processContents="lax"/>
            <xs:element name="footer" type="xs:string"/>
          </xs:sequence>
        </xs:complexType>
      </xs:element>
    </xs:schema>"###;

    // An element from another namespace slots into the wildcard.
    let ok = r#"<container xmlns="urn:container">
      <header>T</header>
      <ns1:x xmlns:ns1="other://extensions"/>
      <footer>E</footer>
    </container>"#;
    let violations = validate(schema, ok);
    assert!(violations.is_empty(), "unexpected: {:?}", violations);

    // A target-namespace element violates ##other.
    let bad = r#"<container xmlns="urn:container">
      <header>T</header>
      <extra/>
      <footer>E</footer>
    </container>"#;
    let violations = validate(schema, bad);
    let wildcard: Vec<_> = violations
        .iter()
        .filter(|v| v.code == codes::CVC_WILDCARD_2)
        .collect();
    assert_eq!(wildcard.len(), 1, "got {:?}", violations);
    assert_eq!(wildcard[0].element.as_ref().unwrap().local, "extra");
}

const LIBRARY_SCHEMA: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="library">
    <xs:complexType>
      <xs:sequence>
        <xs:element name="book" minOccurs="0" maxOccurs="unbounded">
          <xs:complexType>
            <xs:attribute name="isbn" type="xs:string"/>
          </xs:complexType>
        </xs:element>
        <xs:element name="loan" minOccurs="0" maxOccurs="unbounded">
          <xs:complexType>
            <xs:attribute name="book" type="xs:string"/>
          </xs:complexType>
        </xs:element>
      </xs:sequence>
    </xs:complexType>
    <xs:key name="bookKey">
      <xs:selector xpath=".//book"/>
      <xs:field xpath="@isbn"/>
    </xs:key>
    <xs:keyref name="bookRef" refer="bookKey">
      <xs:selector xpath=".//loan"/>
      <xs:field xpath="@book"/>
    </xs:keyref>
  </xs:element>
</xs:schema>"#;

#[test]
fn keyref_without_matching_key() {
    let doc = r#"<library><book isbn="A"/><loan book="B"/></library>"#;
    let violations = validate(LIBRARY_SCHEMA, doc);
    assert_eq!(violations.len(), 1, "got {:?}", violations);
    assert_eq!(violations[0].code, codes::CVC_IDENTITY_CONSTRAINT_4_3);
    assert_eq!(violations[0].element.as_ref().unwrap().local, "loan");
}

#[test]
fn duplicate_key_values() {
    let doc = r#"<library><book isbn="A"/><book isbn="A"/></library>"#;
    let violations = validate(LIBRARY_SCHEMA, doc);
    assert_eq!(violations.len(), 1, "got {:?}", violations);
    assert_eq!(violations[0].code, codes::CVC_IDENTITY_CONSTRAINT_4_1);
}

#[test]
fn consistent_keys_and_refs_pass() {
    let doc = r#"<library><book isbn="A"/><book isbn="B"/><loan book="A"/></library>"#;
    assert!(validate(LIBRARY_SCHEMA, doc).is_empty());
}

#[test]
fn identity_violations_follow_tree_walk_violations() {
    // An unexpected element and a dangling keyref in one document: the
    // identity-constraint violation is appended after the structural one.
    let doc = r#"<library><book isbn="A"/><loan book="B"/><junk/></library>"#;
    let violations = validate(LIBRARY_SCHEMA, doc);
    let junk_idx = violations
        .iter()
        .position(|v| v.code == codes::CVC_COMPLEX_TYPE_2_4_D)
        .expect("structural violation expected");
    let keyref_idx = violations
        .iter()
        .position(|v| v.code == codes::CVC_IDENTITY_CONSTRAINT_4_3)
        .expect("keyref violation expected");
    assert!(junk_idx < keyref_idx);
}

#[test]
fn fixed_value_and_nil() {
    let schema = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
      <xs:element name="version" type="xs:string" fixed="1.0"/>
      <xs:element name="note" type="xs:string"/>
    </xs:schema>"#;

    assert!(validate(schema, "<version>1.0</version>").is_empty());

    let violations = validate(schema, "<version>2.0</version>");
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].code, codes::CVC_ELT_5_2_2);

    let nil_doc =
        r#"<note xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:nil="true"/>"#;
    let violations = validate(schema, nil_doc);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].code, codes::CVC_ELT_3_1);
}

#[test]
fn facets_on_named_simple_types() {
    let schema = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
      <xs:simpleType name="Percent">
        <xs:restriction base="xs:integer">
          <xs:minInclusive value="0"/>
          <xs:maxInclusive value="100"/>
        </xs:restriction>
      </xs:simpleType>
      <xs:simpleType name="Color">
        <xs:restriction base="xs:string">
          <xs:enumeration value="red"/>
          <xs:enumeration value="green"/>
          <xs:enumeration value="blue"/>
        </xs:restriction>
      </xs:simpleType>
      <xs:element name="percent" type="Percent"/>
      <xs:element name="color" type="Color"/>
    </xs:schema>"#;

    assert!(validate(schema, "<percent>50</percent>").is_empty());
    let violations = validate(schema, "<percent>101</percent>");
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].code, codes::CVC_FACET_VALID);
    assert!(violations[0].message.contains("maxInclusive"));

    assert!(validate(schema, "<color>green</color>").is_empty());
    let violations = validate(schema, "<color>yellow</color>");
    assert_eq!(violations.len(), 1);
    assert_eq!(
        violations[0].expected,
        vec!["red".to_string(), "green".to_string(), "blue".to_string()]
    );
}

#[test]
fn required_and_unknown_attributes() {
    let schema = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
      <xs:element name="item">
        <xs:complexType>
          <xs:attribute name="name" type="xs:string" use="required"/>
          <xs:attribute name="count" type="xs:integer"/>
        </xs:complexType>
      </xs:element>
    </xs:schema>"#;

    assert!(validate(schema, r#"<item name="a" count="3"/>"#).is_empty());

    let violations = validate(schema, r#"<item count="3"/>"#);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].code, codes::CVC_COMPLEX_TYPE_4);

    // A near-miss attribute name gets a suggestion.
    let violations = validate(schema, r#"<item name="a" cont="3"/>"#);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].code, codes::CVC_COMPLEX_TYPE_3_2_2);
    assert!(violations[0].expected.contains(&"count".to_string()));
}

#[test]
fn any_attribute_wildcard() {
    let schema = r###"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
        targetNamespace="urn:a" xmlns:a="urn:a" elementFormDefault="qualified">
      <xs:element name="open">
        <xs:complexType>
          <xs:anyAttribute namespace="##other" processContents="skip"/>
        </xs:complexType>
      </xs:element>
    </xs:schema>"###;

    // Foreign-namespace attribute admitted by ##other.
    let ok = r#"<open xmlns="urn:a" xmlns:x="urn:x" x:extra="1"/>"#;
    assert!(validate(schema, ok).is_empty());

    // Unqualified attributes are in no namespace, which ##other permits
    // against a non-empty target namespace; a target-namespace attribute
    // does not.
    let bad = r#"<open xmlns="urn:a" xmlns:a="urn:a" a:extra="1"/>"#;
    let violations = validate(schema, bad);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].code, codes::CVC_WILDCARD_ATTRIBUTE_2);
}

#[test]
fn nested_group_and_choice() {
    let schema = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
      <xs:group name="payload">
        <xs:choice>
          <xs:element name="text" type="xs:string"/>
          <xs:element name="binary" type="xs:base64Binary"/>
        </xs:choice>
      </xs:group>
      <xs:element name="message">
        <xs:complexType>
          <xs:sequence>
            <xs:element name="id" type="xs:string"/>
            <xs:group ref="payload"/>
          </xs:sequence>
        </xs:complexType>
      </xs:element>
    </xs:schema>"#;

    assert!(validate(schema, "<message><id>1</id><text>hi</text></message>").is_empty());
    assert!(validate(schema, "<message><id>1</id><binary>aGk=</binary></message>").is_empty());
}

#[test]
fn simple_content_extension_with_attribute() {
    let schema = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
      <xs:element name="price">
        <xs:complexType>
          <xs:simpleContent>
            <xs:extension base="xs:decimal">
              <xs:attribute name="currency" type="xs:string" use="required"/>
            </xs:extension>
          </xs:simpleContent>
        </xs:complexType>
      </xs:element>
    </xs:schema>"#;

    assert!(validate(schema, r#"<price currency="EUR">9.99</price>"#).is_empty());

    let violations = validate(schema, r#"<price currency="EUR">cheap</price>"#);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].code, codes::CVC_DATATYPE_VALID_1);

    let violations = validate(schema, "<price>9.99</price>");
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].code, codes::CVC_COMPLEX_TYPE_4);
}

#[test]
fn imported_namespace_components_resolve() {
    use std::fs;
    use tempfile::TempDir;
    use xsdvalid::loaders::SchemaLoader;

    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("types.xsd"),
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:types">
             <xs:simpleType name="Code">
               <xs:restriction base="xs:string">
                 <xs:length value="3"/>
               </xs:restriction>
             </xs:simpleType>
           </xs:schema>"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("main.xsd"),
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
              targetNamespace="urn:main" xmlns:t="urn:types">
             <xs:import namespace="urn:types" schemaLocation="types.xsd"/>
             <xs:element name="code" type="t:Code"/>
           </xs:schema>"#,
    )
    .unwrap();

    let loader = SchemaLoader::with_base_dir(dir.path());
    let schema = loader
        .load_with_imports(&dir.path().join("main.xsd").to_string_lossy())
        .unwrap();

    let ok = XmlDocument::parse(r#"<code xmlns="urn:main">abc</code>"#).unwrap();
    assert!(Validator::new(&schema).validate(&ok).is_empty());

    let bad = XmlDocument::parse(r#"<code xmlns="urn:main">toolong</code>"#).unwrap();
    let violations = Validator::new(&schema).validate(&bad);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].code, codes::CVC_FACET_VALID);
}
