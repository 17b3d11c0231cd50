#![allow(dead_code)]

use pathroute::config::RouteFile;
use pathroute::policy::ParameterPolicyFactory;
use pathroute::router::RouteTable;

pub const ZOO_ROUTES: &str = r#"
[[route]]
name = "root_handler"
template = "/"
methods = ["GET"]

[[route]]
name = "get_animals"
template = "zoo/animals"
methods = ["GET"]

[[route]]
name = "create_animal"
template = "zoo/animals"
methods = ["POST"]

[[route]]
name = "get_animal"
template = "zoo/animals/{id:int}"
methods = ["GET"]
route_name = "animal"

[[route]]
name = "update_animal"
template = "zoo/animals/{id:int}"
methods = ["PUT"]

[[route]]
name = "patch_animal"
template = "zoo/animals/{id:int}"
methods = ["PATCH"]

[[route]]
name = "delete_animal"
template = "zoo/animals/{id:int}"
methods = ["DELETE"]

[[route]]
name = "animal_by_name"
template = "zoo/animals/{name}"
methods = ["GET"]

[[route]]
name = "animal_toy"
template = "zoo/animals/{id:int}/toys/{toy_id}"
methods = ["GET"]
route_name = "toy"

[[route]]
name = "habitat_section"
template = "zoo/{category}/animals/{id}/habitats/{habitat_id}/sections/{section_id}"
methods = ["GET"]

[[route]]
name = "health_check"
template = "zoo/health"
methods = ["HEAD"]

[[route]]
name = "supported_ops"
template = "zoo/health"
methods = ["OPTIONS"]

[[route]]
name = "trace_route"
template = "zoo/health"
methods = ["TRACE"]

[[route]]
name = "static_files"
template = "static/{**path}"
methods = ["GET"]
route_name = "static"

[[route]]
name = "reports"
template = "reports/{year:range(2000,2100)}/{name}.{format?}"
methods = ["GET"]
"#;

pub fn zoo_table() -> RouteTable {
    table_from_toml(ZOO_ROUTES)
}

pub fn table_from_toml(text: &str) -> RouteTable {
    let file = RouteFile::from_toml_str(text).unwrap();
    let factory = ParameterPolicyFactory::new(file.options.constraint_map());
    RouteTable::build(file.endpoints().unwrap(), &file.options, &factory).unwrap()
}

pub mod temp_files {
    use std::io::Write;

    /// Route file in the system temp dir, removed on drop.
    pub fn create_temp_toml(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .prefix("pathroute_test_")
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }
}
