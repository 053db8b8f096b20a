fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use packsync_protocol::{
        CheckUploadResponse, Endpoints, StartUploadRequest, StartUploadResponse, UploadKind,
        UploadStatusResponse,
    };

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    /// Loads a fixture JSON file and returns it as a `serde_json::Value`.
    fn load_fixture(name: &str) -> serde_json::Value {
        let path = fixtures_dir().join(name);
        let data = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()));
        serde_json::from_str(&data)
            .unwrap_or_else(|e| panic!("failed to parse fixture {}: {e}", path.display()))
    }

    /// Normalizes JSON values so that integer-valued floats compare equal.
    ///
    /// Servers written against a float-only JSON number type emit sizes as
    /// `2500000.0`; this keeps `2500000` and `2500000.0` equal.
    fn normalize_value(v: &serde_json::Value) -> serde_json::Value {
        match v {
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(f) => serde_json::json!(f),
                None => v.clone(),
            },
            serde_json::Value::Object(map) => {
                let normalized: serde_json::Map<String, serde_json::Value> = map
                    .iter()
                    .map(|(k, v)| (k.clone(), normalize_value(v)))
                    .collect();
                serde_json::Value::Object(normalized)
            }
            serde_json::Value::Array(arr) => {
                serde_json::Value::Array(arr.iter().map(normalize_value).collect())
            }
            _ => v.clone(),
        }
    }

    /// Deserializes a fixture into a Rust type, re-serializes it, and compares
    /// the JSON values (order-independent, float-normalized comparison).
    fn roundtrip_test<T>(name: &str) -> T
    where
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let fixture = load_fixture(name);
        let parsed: T = serde_json::from_value(fixture.clone())
            .unwrap_or_else(|e| panic!("failed to deserialize {name}: {e}"));
        let reserialized = serde_json::to_value(&parsed)
            .unwrap_or_else(|e| panic!("failed to re-serialize {name}: {e}"));

        assert_eq!(
            normalize_value(&fixture),
            normalize_value(&reserialized),
            "roundtrip mismatch for {name}:\n  wire: {fixture}\n  Rust: {reserialized}"
        );
        parsed
    }

    // --- Request bodies ---

    #[test]
    fn fixture_start_upload_request() {
        let req: StartUploadRequest = roundtrip_test("start_upload_request.json");
        assert_eq!(req.kind, UploadKind::Recipes);
        assert_eq!(req.total_size, 2_500_000);
        assert_eq!(req.total_chunks, 3);
        assert!(req.final_hash.starts_with("sha256:"));
    }

    #[test]
    fn fixture_start_upload_request_icons() {
        let req: StartUploadRequest = roundtrip_test("start_upload_request_icons.json");
        assert_eq!(req.kind, UploadKind::Icons);
        assert_eq!(req.total_chunks, 0);
    }

    // --- Response bodies ---

    #[test]
    fn fixture_start_upload_response() {
        let resp: StartUploadResponse = roundtrip_test("start_upload_response.json");
        assert_eq!(resp.session_id, "3f6c1e2a-9b7d-4c1e-8a55-0d2f9e7b1c44");
    }

    #[test]
    fn fixture_upload_status_response() {
        let resp: UploadStatusResponse = roundtrip_test("upload_status_response.json");
        assert_eq!(resp.chunks_received, vec![0, 2, 3]);
    }

    #[test]
    fn fixture_check_upload_response() {
        let resp: CheckUploadResponse = roundtrip_test("check_upload_response.json");
        assert!(resp.exists);
    }

    // --- Lenient parsing ---

    #[test]
    fn status_without_list_means_nothing_received() {
        let json = load_fixture("upload_status_response_empty.json");
        let resp: UploadStatusResponse = serde_json::from_value(json).unwrap();
        assert!(
            resp.chunks_received.is_empty(),
            "missing chunksReceived should default to empty"
        );
    }

    #[test]
    fn check_ignores_unknown_fields() {
        let json = load_fixture("check_upload_response_extra_fields.json");
        let resp: CheckUploadResponse = serde_json::from_value(json).unwrap();
        assert!(!resp.exists);
    }

    // --- URL layout ---

    #[test]
    fn endpoint_layout() {
        let ep = Endpoints::new("https://api.example.com/v1/", "all-the-mods-9", "0.3.1");
        let base = "https://api.example.com/v1/modpacks/all-the-mods-9/versions/0.3.1/upload";
        assert_eq!(ep.check(UploadKind::Recipes), format!("{base}/check?type=recipes"));
        assert_eq!(ep.start(), format!("{base}/start"));
        assert_eq!(ep.status("s1"), format!("{base}/s1/status"));
        assert_eq!(ep.chunk("s1", 4), format!("{base}/s1/chunk/4"));
        assert_eq!(ep.complete("s1"), format!("{base}/s1/complete"));
    }
}
