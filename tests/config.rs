// SPDX-License-Identifier: MIT
// Copyright 2025. Triad National Security, LLC.

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use dbsetup_lib::{
        config::{Config, SecurityMode, StartupType},
        host::TopologyFile,
        inventory::{Action, ClusterInventory, NetworkRole, ServiceIdentity},
        test_env::test_path,
        Error,
    };

    fn fixture(name: &str) -> String {
        test_path(&format!("fixtures/{name}"))
    }

    #[test]
    fn standalone_fixture() {
        let config = Config::from_file(&fixture("standalone.toml")).unwrap();
        let desired = &config.desired;

        assert_eq!(desired.action, Action::Install);
        assert_eq!(desired.instance_name, "MSSQLSERVER");
        assert_eq!(desired.product_version, 15);
        assert_eq!(desired.features, ["SQLENGINE", "FullText", "CONN"]);
        assert_eq!(desired.browser_startup_type, Some(StartupType::Disabled));
        assert_eq!(desired.update_enabled, Some(false));
        assert_eq!(desired.engine.security_mode, SecurityMode::Sql);
        assert_eq!(desired.engine.sysadmin_accounts, ["CORP\\DBA Team"]);
        assert_eq!(desired.engine.data_dir.as_deref(), Some("D:\\MSSQL\\Data\\"));
        assert_eq!(
            desired.service_accounts.sql,
            Some(ServiceIdentity::new("CORP\\sqlsvc", Some("Svc#Secret")))
        );
        assert_eq!(
            desired.service_accounts.agent,
            Some(ServiceIdentity::new("NT SERVICE\\SQLSERVERAGENT", None))
        );
        assert_eq!(desired.service_accounts.fulltext, None);
        assert!(!desired.suppress_reboot);

        let host = &config.host;
        assert_eq!(host.setup_timeout_secs, 3600);
        assert_eq!(host.installer_path(), "/srv/media/sql2019/setup.exe");
        assert_eq!(host.topology, None);
    }

    #[test]
    fn cluster_fixture() {
        let config = Config::from_file(&fixture("cluster.toml")).unwrap();
        let desired = &config.desired;

        assert_eq!(desired.action, Action::InstallFailoverCluster);
        assert_eq!(desired.engine.security_mode, SecurityMode::Windows);
        assert_eq!(desired.cluster.group_name.as_deref(), Some("SQL Server (PROD)"));
        assert_eq!(
            desired.cluster.ip_addresses,
            [Ipv4Addr::new(10, 0, 0, 5)]
        );
        // An absolute installer path is not joined onto the media path.
        assert_eq!(config.host.installer_path(), "/mnt/media/setup.exe");
        assert_eq!(config.host.node_name.as_deref(), Some("NODE1"));
        assert_eq!(config.host.setup_timeout_secs, 7200);
    }

    #[test]
    fn missing_file() {
        let err = Config::from_file(&fixture("does-not-exist.toml")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    fn invalid(toml: &str) -> String {
        match Config::from_toml(toml) {
            Err(Error::Config(msg)) => msg,
            other => panic!("expected a configuration error, got {other:?}"),
        }
    }

    #[test]
    fn desired_section_is_required() {
        invalid("[host]\nprobe_command = \"probe\"\n");
    }

    #[test]
    fn instance_name_is_required() {
        let msg = invalid("[desired]\nproduct_version = 15\nfeatures = [\"SQLENGINE\"]\n");
        assert!(msg.contains("instance_name"));
    }

    #[test]
    fn product_version_is_required() {
        let msg = invalid("[desired]\ninstance_name = \"A\"\n");
        assert!(msg.contains("product_version"));
    }

    #[test]
    fn mixed_mode_requires_sa_password() {
        let msg = invalid(
            "[desired]\ninstance_name = \"A\"\nproduct_version = 15\n\
             [desired.engine]\nsecurity_mode = \"Sql\"\n",
        );
        assert!(msg.contains("sa_password"));
    }

    #[test]
    fn quote_in_a_secret_is_rejected() {
        let msg = invalid(
            "[desired]\ninstance_name = \"A\"\nproduct_version = 15\n\
             [desired.engine]\nsecurity_mode = \"Sql\"\nsa_password = 'x\" /ACTION=\"Uninstall'\n",
        );
        assert!(msg.contains("engine.sa_password"), "{msg}");
        assert!(!msg.contains("Uninstall"));
    }

    #[test]
    fn quote_in_a_list_is_rejected() {
        let msg = invalid(
            "[desired]\ninstance_name = \"A\"\nproduct_version = 15\n\
             [desired.engine]\nsysadmin_accounts = ['CORP\\ok', 'CORP\\a\"b']\n",
        );
        assert!(msg.contains("engine.sysadmin_accounts[1]"), "{msg}");
    }

    #[test]
    fn ordinary_account_requires_a_password() {
        let msg = invalid(
            "[desired]\ninstance_name = \"A\"\nproduct_version = 15\n\
             [desired.service_accounts.sql]\nusername = 'CORP\\sqlsvc'\n",
        );
        assert!(msg.contains("CORP\\sqlsvc"), "{msg}");
        assert!(msg.contains("password"));

        // Accounts the platform manages need none.
        for username in ["NT SERVICE\\MSSQLSERVER", "NT AUTHORITY\\SYSTEM", "CORP\\gmsa$"] {
            Config::from_toml(&format!(
                "[desired]\ninstance_name = \"A\"\nproduct_version = 15\n\
                 [desired.service_accounts.sql]\nusername = '{username}'\n"
            ))
            .unwrap();
        }
    }

    #[test]
    fn cluster_actions_require_a_group() {
        let msg = invalid(
            "[desired]\naction = \"AddNode\"\ninstance_name = \"A\"\nproduct_version = 15\n",
        );
        assert!(msg.contains("group_name"));

        // A prepared node has no group yet.
        Config::from_toml(
            "[desired]\naction = \"PrepareFailoverCluster\"\ninstance_name = \"A\"\n\
             product_version = 15\n",
        )
        .unwrap();
    }

    #[test]
    fn failover_install_requires_a_network_name() {
        let msg = invalid(
            "[desired]\naction = \"InstallFailoverCluster\"\ninstance_name = \"A\"\n\
             product_version = 15\n[desired.cluster]\ngroup_name = \"G\"\n",
        );
        assert!(msg.contains("network_name"));
    }

    #[test]
    fn malformed_address_is_rejected() {
        invalid(
            "[desired]\ninstance_name = \"A\"\nproduct_version = 15\n\
             [desired.cluster]\nip_addresses = [\"10.0.0.300\"]\n",
        );
    }

    #[test]
    fn unknown_action_is_rejected() {
        invalid("[desired]\naction = \"Upgrade\"\ninstance_name = \"A\"\nproduct_version = 15\n");
    }

    #[test]
    fn topology_fixture() {
        let topology = TopologyFile::from_file(&fixture("topology.toml")).unwrap();

        let all: Vec<String> = topology
            .disk_resources(false)
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(all, ["Cluster Disk 1", "Cluster Disk 2", "Quorum"]);

        let free: Vec<String> = topology
            .disk_resources(true)
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(free, ["Cluster Disk 1", "Cluster Disk 2"]);

        let client = topology.network_resources(NetworkRole::Client).unwrap();
        assert_eq!(client.len(), 1);
        assert_eq!(client[0].name, "Client");
        assert_eq!(client[0].address, Ipv4Addr::new(10, 0, 0, 0));
        assert_eq!(client[0].mask, Ipv4Addr::new(255, 255, 255, 0));

        let all = topology.network_resources(NetworkRole::None).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].address, Ipv4Addr::new(192, 168, 100, 0));
        assert_eq!(all[1].mask, Ipv4Addr::new(255, 255, 255, 0));
    }

    /// A host address in CIDR form names the network it belongs to.
    #[test]
    fn cidr_host_address() {
        let topology = TopologyFile::from_toml(
            "[[networks]]\nname = \"Client\"\nnetwork = \"10.20.30.40/16\"\nrole = \"client\"\n",
        )
        .unwrap();
        let networks = topology.network_resources(NetworkRole::Client).unwrap();
        assert_eq!(networks[0].address, Ipv4Addr::new(10, 20, 0, 0));
        assert_eq!(networks[0].mask, Ipv4Addr::new(255, 255, 0, 0));
    }

    #[test]
    fn network_without_address_is_rejected() {
        let topology =
            TopologyFile::from_toml("[[networks]]\nname = \"Client\"\nrole = \"client\"\n")
                .unwrap();
        let err = topology.network_resources(NetworkRole::Client).unwrap_err();
        assert!(matches!(err, Error::ClusterInventory(_)));

        let topology = TopologyFile::from_toml(
            "[[networks]]\nname = \"Client\"\nnetwork = \"10.0.0.0/40\"\nrole = \"client\"\n",
        )
        .unwrap();
        assert!(topology.network_resources(NetworkRole::Client).is_err());
    }
}
