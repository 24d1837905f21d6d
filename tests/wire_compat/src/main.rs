fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use coletor_protocol::SystemSnapshot;

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    /// Loads a fixture JSON file and returns it as a `serde_json::Value`.
    ///
    /// Fixtures are request bodies captured from the Python collector the
    /// service was built against; they pin the wire contract.
    fn load_fixture(name: &str) -> serde_json::Value {
        let path = fixtures_dir().join(name);
        let data = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()));
        serde_json::from_str(&data)
            .unwrap_or_else(|e| panic!("failed to parse fixture {}: {e}", path.display()))
    }

    /// Deserializes a fixture into a Rust type, re-serializes it, and
    /// compares the JSON values (order-independent comparison).
    fn roundtrip_test<T>(name: &str)
    where
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let fixture = load_fixture(name);
        let parsed: T = serde_json::from_value(fixture.clone())
            .unwrap_or_else(|e| panic!("failed to deserialize {name}: {e}"));
        let reserialized = serde_json::to_value(&parsed)
            .unwrap_or_else(|e| panic!("failed to re-serialize {name}: {e}"));

        assert_eq!(
            fixture, reserialized,
            "roundtrip mismatch for {name}:\n  legacy: {fixture}\n  Rust:   {reserialized}"
        );
    }

    const WIRE_KEYS: [&str; 11] = [
        "nome",
        "tipo",
        "serial",
        "status",
        "processador",
        "memoria_ram",
        "armazenamento",
        "acesso_remoto",
        "sistema_operacional",
        "ultimo_usuario",
        "tempo_ligado",
    ];

    #[test]
    fn fixture_snapshot_windows() {
        roundtrip_test::<SystemSnapshot>("snapshot_windows.json");
    }

    #[test]
    fn fixture_snapshot_linux_auto_serial() {
        roundtrip_test::<SystemSnapshot>("snapshot_linux_auto_serial.json");
    }

    #[test]
    fn fixture_snapshot_degraded() {
        roundtrip_test::<SystemSnapshot>("snapshot_degraded.json");
    }

    #[test]
    fn fixtures_carry_the_full_column_set() {
        for name in [
            "snapshot_windows.json",
            "snapshot_linux_auto_serial.json",
            "snapshot_degraded.json",
        ] {
            let fixture = load_fixture(name);
            let keys: Vec<&str> = fixture
                .as_object()
                .unwrap_or_else(|| panic!("{name} is not an object"))
                .keys()
                .map(String::as_str)
                .collect();
            let mut expected: Vec<&str> = WIRE_KEYS.to_vec();
            let mut got = keys.clone();
            expected.sort_unstable();
            got.sort_unstable();
            assert_eq!(got, expected, "column drift in {name}");
        }
    }

    #[test]
    fn serialized_snapshot_keeps_explicit_null() {
        let fixture = load_fixture("snapshot_windows.json");
        let snap: SystemSnapshot = serde_json::from_value(fixture).unwrap();
        let json = serde_json::to_string(&snap).unwrap();
        assert!(
            json.contains("\"acesso_remoto\":null"),
            "reserved column must survive as an explicit null: {json}"
        );
    }

    #[test]
    fn degraded_fixture_uses_documented_fallbacks() {
        let fixture = load_fixture("snapshot_degraded.json");
        let snap: SystemSnapshot = serde_json::from_value(fixture).unwrap();
        assert!(snap.serial.starts_with("AUTO-"));
        assert_eq!(snap.processor, "");
        assert_eq!(snap.memory, "");
        assert_eq!(snap.storage, "");
        assert_eq!(snap.last_user, "Desconhecido");
        assert_eq!(snap.uptime, "Desconhecido");
    }
}
