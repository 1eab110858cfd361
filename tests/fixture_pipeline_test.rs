//! End-to-end pipeline tests over the ten CSV shapes the standardizer
//! is expected to handle: standard headers, alternative headers, combined
//! addresses, split fields, full state names, mixed quality, business
//! formats, messy formatting, PO boxes and international rows.

use addr_standardizer::ingest::read_csv_reader;
use addr_standardizer::pipeline::qualify::IssueType;
use addr_standardizer::pipeline::{Pipeline, PipelineResult};
use addr_standardizer::report::QualificationSummary;

fn run(csv_data: &str, file_name: &str) -> PipelineResult {
    let batch = read_csv_reader(csv_data.as_bytes(), file_name).expect("csv should parse");
    Pipeline::default().process(&[batch]).expect("pipeline should run")
}

#[test]
fn standard_format_is_fully_qualified() {
    let data = "\
first_name,last_name,street_address,city,state,zip_code
John,Smith,1600 Pennsylvania Avenue NW,Washington,DC,20500
Jane,Johnson,350 Fifth Avenue,New York,NY,10118
Michael,Williams,1 Apple Park Way,Cupertino,CA,95014
Sarah,Brown,1 Microsoft Way,Redmond,WA,98052
David,Davis,410 Terry Avenue North,Seattle,WA,98109
";
    let result = run(data, "01_standard_format.csv");

    assert_eq!(result.records.len(), 5);
    assert_eq!(result.qualified_count(), 5);

    let summary = QualificationSummary::from_result(&result);
    assert!(summary.qualification_rate >= 0.9);
}

#[test]
fn alternative_headers_map_and_qualify() {
    let data = "\
fname,lname,addr,town,st,postal
Robert,Garcia,123 Main Street,Los Angeles,CA,90210
Lisa,Miller,456 Oak Avenue,Chicago,IL,60601
Christopher,Rodriguez,789 Pine Road,Houston,TX,77001
Amanda,Martinez,321 Elm Street,Phoenix,AZ,85001
";
    let result = run(data, "02_alternative_columns.csv");

    assert_eq!(result.qualified_count(), 4);
    let first = &result.records[0].record.address;
    assert_eq!(first.first_name, "Robert");
    assert_eq!(first.last_name, "Garcia");
    assert_eq!(first.street_address, "123 Main Street");
    assert_eq!(first.city, "Los Angeles");
    assert_eq!(first.state, "CA");
    assert_eq!(first.zip_code, "90210");
}

#[test]
fn combined_addresses_parse_into_components() {
    let data = "\
first,last,full_address,customer_id
William,Anderson,\"1600 Pennsylvania Avenue NW, Washington, DC 20500\",CUST001
Jessica,Thomas,\"350 Fifth Avenue, New York, NY 10118\",CUST002
James,Jackson,\"1 Apple Park Way, Cupertino, CA 95014\",CUST003
Ashley,White,\"1 Microsoft Way, Redmond, WA 98052\",CUST004
Matthew,Harris,\"410 Terry Avenue North, Seattle, WA 98109\",CUST005
";
    let result = run(data, "03_combined_addresses.csv");

    assert_eq!(result.qualified_count(), 5);
    assert!(result.batches[0].mapping.combined_address.is_some());

    let second = &result.records[1].record.address;
    assert_eq!(second.street_address, "350 Fifth Avenue");
    assert_eq!(second.city, "New York");
    assert_eq!(second.state, "NY");
    assert_eq!(second.zip_code, "10118");
}

#[test]
fn split_address_fields_merge_and_qualify() {
    let data = "\
given_name,family_name,house_number,street_name,apartment,city_name,state_code,zip5,zip4
Daniel,Moore,123,Main Street,Apt 2A,Dallas,TX,75201,1234
Emily,Taylor,456,Oak Avenue,,San Antonio,TX,78201,
Anthony,Clark,789,Pine Road,Unit 5,Austin,TX,73301,5678
Melissa,Lewis,321,Elm Street,Suite 100,Fort Worth,TX,76101,9012
";
    let result = run(data, "04_split_address_fields.csv");

    assert_eq!(result.qualified_count(), 4);

    let first = &result.records[0].record.address;
    assert_eq!(first.street_address, "123 Main Street");
    assert_eq!(first.unit, "Apt 2A");
    assert_eq!(first.zip_code, "75201-1234");

    let second = &result.records[1].record.address;
    assert_eq!(second.unit, "");
    assert_eq!(second.zip_code, "78201");
}

#[test]
fn full_state_names_convert_to_codes() {
    let data = "\
first_name,last_name,street_address,city,state,zip_code
Mark,Wilson,987 Cedar Lane,San Jose,California,95101
Nancy,Garcia,147 Birch Way,San Diego,California,92101
Steven,Martinez,258 Walnut Court,Sacramento,California,94203
Karen,Anderson,369 Cherry Street,Fresno,California,93701
";
    let result = run(data, "05_full_state_names.csv");

    assert_eq!(result.qualified_count(), 4);
    for record in &result.records {
        assert_eq!(record.record.address.state, "CA");
        assert!(record.record.report.state_name_converted);
    }
}

#[test]
fn mixed_quality_data_qualifies_three_of_five() {
    let data = "\
first_name,last_name,street_address,city,state,zip_code
Paul,Johnson,741 Ash Boulevard,Jacksonville,FL,32099
Linda,Brown,852 Hickory Drive,Columbus,OH,43085
Valid,Person,123 Good Street,Valid City,NY,10001
Missing,Address,,Missing State,,12345
Invalid,State,456 Bad Road,Invalid State,XX,00000
";
    let result = run(data, "06_mixed_quality_data.csv");

    assert_eq!(result.records.len(), 5);
    assert_eq!(result.qualified_count(), 3);

    let missing = &result.records[3].result;
    assert!(!missing.qualified);
    assert!(missing.error_messages().contains(&"missing street address".to_string()));
    assert!(missing.error_messages().contains(&"missing state".to_string()));

    let invalid = &result.records[4].result;
    assert!(!invalid.qualified);
    assert!(invalid
        .error_messages()
        .iter()
        .any(|e| e.contains("invalid state code 'XX'")));
    assert!(invalid
        .error_messages()
        .iter()
        .any(|e| e.contains("invalid ZIP code '00000'")));

    let summary = QualificationSummary::from_result(&result);
    assert!((summary.qualification_rate - 0.6).abs() < 1e-9);
}

#[test]
fn business_headers_map_and_qualify() {
    let data = "\
contact_first,contact_last,company_name,mailing_address,municipality,province,postal,business_type
John,Smith,Tech Solutions Inc,100 Business Park Dr Suite 200,Atlanta,GA,30309,Technology
,ABC Corporation,ABC Corporation,250 Corporate Center,Denver,CO,80202,Consulting
Sarah,Johnson,Marketing Plus LLC,500 Industrial Blvd,Memphis,TN,38103,Marketing
Michael,Williams,Business Services Co,750 Commerce Way,Portland,OR,97201,Services
";
    let result = run(data, "07_business_format.csv");

    // Missing contact first name is a warning, not a disqualification
    assert_eq!(result.qualified_count(), 4);

    let first = &result.records[0].record.address;
    assert_eq!(first.street_address, "100 Business Park Dr");
    assert_eq!(first.unit, "Suite 200");
    assert_eq!(first.city, "Atlanta");
    assert_eq!(first.state, "GA");
}

#[test]
fn messy_formatting_is_cleaned() {
    let data = "\
FirstName,LastName,StreetAddr,City,State,PostalCode,Notes
  ROBERT  ,  GARCIA  ,  123 Main Street  ,  LOS ANGELES  ,  ca  ,90210-1234,Good address
jane,smith,456 oak avenue,chicago,IL,60601,Needs cleaning
MiChAeL,JOHNSON,789 PINE ROAD,HOUSTON,tx,77001-5678,Upper case
,NoFirstName,321 Elm St Apt B,phoenix,AZ,85001,Missing first name
";
    let result = run(data, "08_messy_formatting.csv");

    // Every address is complete; missing first name only warns
    assert_eq!(result.qualified_count(), 4);

    let first = &result.records[0].record.address;
    assert_eq!(first.first_name, "Robert");
    assert_eq!(first.last_name, "Garcia");
    assert_eq!(first.state, "CA");
    assert_eq!(first.zip_code, "90210-1234");

    let third = &result.records[2].record.address;
    assert_eq!(third.first_name, "Michael");
    assert_eq!(third.state, "TX");

    let fourth = &result.records[3];
    assert!(fourth.result.qualified);
    assert!(fourth
        .result
        .warning_messages()
        .contains(&"missing first name".to_string()));
    assert_eq!(fourth.record.address.street_address, "321 Elm St");
    assert_eq!(fourth.record.address.unit, "Apt B");
}

#[test]
fn po_boxes_and_special_cases_qualify() {
    let data = "\
first_name,last_name,street_address,city,state,zip_code
Mary,Wilson,PO Box 12345,Rural Town,MT,59718
James,Rodriguez,P.O. Box 67890,Small City,ND,58102
Susan,Davis,123 Rural Route 1,Farm Town,SD,57001
Robert,Miller,General Delivery,Remote Place,WY,82414
Jennifer,Garcia,456 Highway 101,Highway City,NE,68005
";
    let result = run(data, "09_po_boxes_special_cases.csv");

    assert_eq!(result.qualified_count(), 5);
    assert_eq!(result.records[0].record.address.street_address, "PO Box 12345");
    assert_eq!(result.records[4].record.address.street_address, "456 Highway 101");
}

#[test]
fn international_rows_are_disqualified() {
    let data = "\
first_name,last_name,street_address,city,state,zip_code
Alice,Johnson,123 Valid US Street,New York,NY,10001
Bob,Smith,45 Fake International Rd,Toronto,ON,M5V 3A8
Charlie,Brown,789 US Avenue,Chicago,IL,60601
Diana,Wilson,12 London Street,London,UK,SW1A 1AA
Edward,Davis,456 US Boulevard,Boston,MA,02101
";
    let result = run(data, "10_international_mixed.csv");

    assert_eq!(result.records.len(), 5);
    assert_eq!(result.qualified_count(), 3);

    let toronto = &result.records[1].result;
    assert!(!toronto.qualified);
    assert!(toronto
        .issues
        .iter()
        .any(|i| i.issue_type == IssueType::InternationalAddress));
    assert!(toronto
        .error_messages()
        .contains(&"international address".to_string()));

    let london = &result.records[3].result;
    assert!(!london.qualified);
    assert!(london
        .issues
        .iter()
        .any(|i| i.issue_type == IssueType::InternationalAddress));

    // US rows are unaffected
    assert!(result.records[0].result.qualified);
    assert!(result.records[2].result.qualified);
    assert!(result.records[4].result.qualified);
}

#[test]
fn multiple_files_combine_in_order() {
    let standard = "\
first_name,last_name,street_address,city,state,zip_code
John,Smith,1600 Pennsylvania Avenue NW,Washington,DC,20500
";
    let alternative = "\
fname,lname,addr,town,st,postal
Robert,Garcia,123 Main Street,Los Angeles,CA,90210
";
    let batch_a = read_csv_reader(standard.as_bytes(), "a.csv").unwrap();
    let batch_b = read_csv_reader(alternative.as_bytes(), "b.csv").unwrap();

    let result = Pipeline::default().process(&[batch_a, batch_b]).unwrap();

    assert_eq!(result.records.len(), 2);
    assert_eq!(result.records[0].record.provenance.source_file, "a.csv");
    assert_eq!(result.records[1].record.provenance.source_file, "b.csv");

    let summary = QualificationSummary::from_result(&result);
    assert_eq!(summary.file_breakdown.len(), 2);
    assert_eq!(summary.file_breakdown[0].file_name, "a.csv");
    assert_eq!(summary.file_breakdown[1].qualified, 1);
}
