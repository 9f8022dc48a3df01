/// Integration tests for the domain services over the local backend
///
/// Run with: cargo test --test services_tests

use attendly_shared::models::{
    AttendanceStatus, CreateEventDate, CreateGroup, CreateMember, CreateOrganization, Group,
    RecordAttendance, UpdateGroup, UpdateMember, UpdateOrganization,
};
use attendly_shared::services::Services;
use attendly_shared::storage::local::{FileStore, LocalStore};
use attendly_shared::storage::Storage;
use attendly_shared::Error;
use chrono::{NaiveDate, Utc};

fn services() -> Services {
    Services::new(Storage::in_memory())
}

fn org_input(name: &str) -> CreateOrganization {
    CreateOrganization {
        name: name.to_string(),
        description: None,
    }
}

fn group_input(name: &str, order: i32) -> CreateGroup {
    CreateGroup {
        name: name.to_string(),
        order,
        color: None,
    }
}

fn member_input(group_id: &str, name: &str) -> CreateMember {
    CreateMember {
        group_id: group_id.to_string(),
        name: name.to_string(),
    }
}

fn event_input(day: u32) -> CreateEventDate {
    CreateEventDate {
        date: NaiveDate::from_ymd_opt(2025, 6, day).unwrap(),
        title: "Rehearsal".to_string(),
        location: Some("Hall B".to_string()),
    }
}

#[tokio::test]
async fn test_create_then_get_organization() {
    let services = services();
    let before = Utc::now();

    let created = services
        .organizations
        .create(CreateOrganization {
            name: "Choir".to_string(),
            description: Some("Weekly practice".to_string()),
        })
        .await
        .unwrap();

    let fetched = services
        .organizations
        .get_by_id(&created.id)
        .await
        .unwrap()
        .expect("organization should exist");

    assert_eq!(fetched, created);
    assert_eq!(fetched.name, "Choir");
    assert_eq!(fetched.description.as_deref(), Some("Weekly practice"));
    assert_eq!(fetched.id.len(), 12);
    assert!(fetched.created_at >= before);
}

#[tokio::test]
async fn test_get_missing_organization_is_none() {
    let services = services();
    let result = services.organizations.get_by_id("non-existent-id").await;
    assert!(matches!(result, Ok(None)));
}

#[tokio::test]
async fn test_organizations_sorted_newest_first() {
    let services = services();

    let mut ids = Vec::new();
    for name in ["first", "second", "third"] {
        ids.push(services.organizations.create(org_input(name)).await.unwrap().id);
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let all = services.organizations.get_all().await.unwrap();
    let listed: Vec<_> = all.iter().map(|o| o.id.clone()).collect();
    ids.reverse();
    assert_eq!(listed, ids);
    assert!(all.windows(2).all(|w| w[0].created_at >= w[1].created_at));
}

#[tokio::test]
async fn test_create_organization_rejects_blank_name() {
    let services = services();
    let result = services.organizations.create(org_input("")).await;
    assert!(matches!(result, Err(Error::Validation(_))));
    assert!(services.organizations.get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_organization_merges_fields() {
    let services = services();
    let org = services
        .organizations
        .create(CreateOrganization {
            name: "Band".to_string(),
            description: Some("Original".to_string()),
        })
        .await
        .unwrap();

    let updated = services
        .organizations
        .update(
            &org.id,
            UpdateOrganization {
                name: Some("Big Band".to_string()),
                description: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Big Band");
    assert_eq!(updated.description.as_deref(), Some("Original"));
    assert_eq!(updated.created_at, org.created_at);

    let missing = services
        .organizations
        .update("nope", UpdateOrganization::default())
        .await;
    assert!(matches!(missing, Err(ref e) if e.is_not_found()));
}

#[tokio::test]
async fn test_delete_organization_cascades() {
    let services = services();
    let org = services.organizations.create(org_input("Doomed")).await.unwrap();
    let keep = services.organizations.create(org_input("Kept")).await.unwrap();

    for target in [&org.id, &keep.id] {
        let group = services.groups.create(target, group_input("G", 1)).await.unwrap();
        let member = services
            .members
            .create(target, member_input(&group.id, "M"))
            .await
            .unwrap();
        let event = services.event_dates.create(target, event_input(1)).await.unwrap();
        services
            .attendance
            .record(
                target,
                &event.id,
                RecordAttendance {
                    member_id: member.id,
                    status: AttendanceStatus::Attending,
                },
            )
            .await
            .unwrap();
    }

    services.organizations.delete(&org.id).await.unwrap();

    let remaining = services.organizations.get_all().await.unwrap();
    assert!(remaining.iter().all(|o| o.id != org.id));
    assert!(services.groups.get_all(&org.id).await.unwrap().is_empty());
    assert!(services.members.get_all(&org.id).await.unwrap().is_empty());
    assert!(services.event_dates.get_all(&org.id).await.unwrap().is_empty());
    assert!(services.attendance.get_all(&org.id).await.unwrap().is_empty());

    assert_eq!(services.groups.get_all(&keep.id).await.unwrap().len(), 1);
    assert_eq!(services.attendance.get_all(&keep.id).await.unwrap().len(), 1);

    let again = services.organizations.delete(&org.id).await;
    assert!(matches!(again, Err(ref e) if e.is_not_found()));
}

#[tokio::test]
async fn test_organizations_are_isolated() {
    let services = services();
    let a = services.organizations.create(org_input("A")).await.unwrap();
    let b = services.organizations.create(org_input("B")).await.unwrap();

    let group_a = services.groups.create(&a.id, group_input("Alto", 1)).await.unwrap();
    let group_b = services.groups.create(&b.id, group_input("Bass", 1)).await.unwrap();
    services
        .members
        .create(&a.id, member_input(&group_a.id, "Aiko"))
        .await
        .unwrap();

    let groups_a = services.groups.get_all(&a.id).await.unwrap();
    let groups_b = services.groups.get_all(&b.id).await.unwrap();
    assert_eq!(groups_a, vec![group_a.clone()]);
    assert_eq!(groups_b, vec![group_b.clone()]);
    assert!(services.members.get_all(&b.id).await.unwrap().is_empty());

    // A group from another organization is not a valid parent
    let cross = services
        .members
        .create(&b.id, member_input(&group_a.id, "Intruder"))
        .await;
    assert!(matches!(cross, Err(Error::Validation(_))));
}

#[tokio::test]
async fn test_save_groups_round_trip_preserves_order() {
    let services = services();
    let org = services.organizations.create(org_input("Order")).await.unwrap();

    let groups: Vec<Group> = [("Tenor", 3), ("Soprano", 1), ("Bass", 2)]
        .into_iter()
        .enumerate()
        .map(|(i, (name, order))| Group {
            id: format!("g{}", i),
            organization_id: org.id.clone(),
            name: name.to_string(),
            order,
            color: None,
            created_at: Utc::now(),
        })
        .collect();

    services.groups.save_all(&org.id, &groups).await.unwrap();
    assert_eq!(services.groups.get_all(&org.id).await.unwrap(), groups);

    let sorted: Vec<_> = services
        .groups
        .get_sorted(&org.id)
        .await
        .unwrap()
        .into_iter()
        .map(|g| g.name)
        .collect();
    assert_eq!(sorted, vec!["Soprano", "Bass", "Tenor"]);
}

#[tokio::test]
async fn test_scenario_music_circle_survives_fresh_context() {
    let dir = tempfile::tempdir().unwrap();

    let (org_id, group_ids) = {
        let storage = Storage::local(LocalStore::new(FileStore::open(dir.path()).unwrap()));
        let services = Services::new(storage);

        let org = services.organizations.create(org_input("音楽サークル")).await.unwrap();
        let first = services.groups.create(&org.id, group_input("弦楽器", 1)).await.unwrap();
        let second = services.groups.create(&org.id, group_input("管楽器", 2)).await.unwrap();
        services
            .members
            .create(&org.id, member_input(&first.id, "佐藤"))
            .await
            .unwrap();
        services
            .members
            .create(&org.id, member_input(&second.id, "鈴木"))
            .await
            .unwrap();
        (org.id, vec![first.id, second.id])
    };

    // A new facade over the same directory sees the same data
    let storage = Storage::local(LocalStore::new(FileStore::open(dir.path()).unwrap()));
    let services = Services::new(storage);

    let org = services
        .organizations
        .get_by_id(&org_id)
        .await
        .unwrap()
        .expect("bookmarked organization should load");
    assert_eq!(org.name, "音楽サークル");

    let groups = services.groups.get_all(&org_id).await.unwrap();
    let ids: Vec<_> = groups.iter().map(|g| g.id.clone()).collect();
    assert_eq!(ids, group_ids);
    assert_eq!(groups[0].order, 1);
    assert_eq!(groups[1].order, 2);

    let members = services.members.get_all(&org_id).await.unwrap();
    assert_eq!(members.len(), 2);
    assert_eq!(members[0].name, "佐藤");
    assert_eq!(members[0].group_id, group_ids[0]);
    assert_eq!(members[1].name, "鈴木");
    assert_eq!(members[1].group_id, group_ids[1]);
    assert!(members.iter().all(|m| m.organization_id == org_id));
}

#[tokio::test]
async fn test_group_update_and_delete_cascade() {
    let services = services();
    let org = services.organizations.create(org_input("Club")).await.unwrap();
    let group = services.groups.create(&org.id, group_input("Strings", 1)).await.unwrap();
    let other = services.groups.create(&org.id, group_input("Brass", 2)).await.unwrap();
    let member = services
        .members
        .create(&org.id, member_input(&group.id, "Ito"))
        .await
        .unwrap();
    let survivor = services
        .members
        .create(&org.id, member_input(&other.id, "Kato"))
        .await
        .unwrap();
    let event = services.event_dates.create(&org.id, event_input(2)).await.unwrap();
    for member_id in [&member.id, &survivor.id] {
        services
            .attendance
            .record(
                &org.id,
                &event.id,
                RecordAttendance {
                    member_id: member_id.clone(),
                    status: AttendanceStatus::Tentative,
                },
            )
            .await
            .unwrap();
    }

    let renamed = services
        .groups
        .update(
            &org.id,
            &group.id,
            UpdateGroup {
                name: Some("Violins".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Violins");
    assert_eq!(renamed.order, 1);

    services.groups.delete(&org.id, &group.id).await.unwrap();

    let members = services.members.get_all(&org.id).await.unwrap();
    assert_eq!(members, vec![survivor.clone()]);
    let attendances = services.attendance.get_all(&org.id).await.unwrap();
    assert_eq!(attendances.len(), 1);
    assert_eq!(attendances[0].member_id, survivor.id);

    let missing = services.groups.delete(&org.id, &group.id).await;
    assert!(matches!(missing, Err(ref e) if e.is_not_found()));
}

#[tokio::test]
async fn test_member_move_and_delete() {
    let services = services();
    let org = services.organizations.create(org_input("Club")).await.unwrap();
    let a = services.groups.create(&org.id, group_input("A", 1)).await.unwrap();
    let b = services.groups.create(&org.id, group_input("B", 2)).await.unwrap();
    let member = services
        .members
        .create(&org.id, member_input(&a.id, "Mori"))
        .await
        .unwrap();

    let moved = services
        .members
        .update(
            &org.id,
            &member.id,
            UpdateMember {
                group_id: Some(b.id.clone()),
                name: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.group_id, b.id);
    assert_eq!(moved.name, "Mori");
    assert!(services.members.get_by_group(&org.id, &a.id).await.unwrap().is_empty());
    assert_eq!(services.members.get_by_group(&org.id, &b.id).await.unwrap().len(), 1);

    let bad_move = services
        .members
        .update(
            &org.id,
            &member.id,
            UpdateMember {
                group_id: Some("missing".to_string()),
                name: None,
            },
        )
        .await;
    assert!(matches!(bad_move, Err(Error::Validation(_))));

    let event = services.event_dates.create(&org.id, event_input(3)).await.unwrap();
    services
        .attendance
        .record(
            &org.id,
            &event.id,
            RecordAttendance {
                member_id: member.id.clone(),
                status: AttendanceStatus::Absent,
            },
        )
        .await
        .unwrap();

    services.members.delete(&org.id, &member.id).await.unwrap();
    assert!(services.members.get_by_id(&org.id, &member.id).await.unwrap().is_none());
    assert!(services.attendance.get_all(&org.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_event_date_delete_cascades_attendance() {
    let services = services();
    let org = services.organizations.create(org_input("Club")).await.unwrap();
    let group = services.groups.create(&org.id, group_input("G", 1)).await.unwrap();
    let member = services
        .members
        .create(&org.id, member_input(&group.id, "Ueda"))
        .await
        .unwrap();
    let doomed = services.event_dates.create(&org.id, event_input(4)).await.unwrap();
    let kept = services.event_dates.create(&org.id, event_input(5)).await.unwrap();

    for event_id in [&doomed.id, &kept.id] {
        services
            .attendance
            .record(
                &org.id,
                event_id,
                RecordAttendance {
                    member_id: member.id.clone(),
                    status: AttendanceStatus::Attending,
                },
            )
            .await
            .unwrap();
    }

    services.event_dates.delete(&org.id, &doomed.id).await.unwrap();

    let attendances = services.attendance.get_all(&org.id).await.unwrap();
    assert_eq!(attendances.len(), 1);
    assert_eq!(attendances[0].event_date_id, kept.id);
}

#[tokio::test]
async fn test_record_attendance_upserts_pair() {
    let services = services();
    let org = services.organizations.create(org_input("Club")).await.unwrap();
    let group = services.groups.create(&org.id, group_input("G", 1)).await.unwrap();
    let member = services
        .members
        .create(&org.id, member_input(&group.id, "Noda"))
        .await
        .unwrap();
    let event = services.event_dates.create(&org.id, event_input(6)).await.unwrap();

    let first = services
        .attendance
        .record(
            &org.id,
            &event.id,
            RecordAttendance {
                member_id: member.id.clone(),
                status: AttendanceStatus::Tentative,
            },
        )
        .await
        .unwrap();
    let second = services
        .attendance
        .record(
            &org.id,
            &event.id,
            RecordAttendance {
                member_id: member.id.clone(),
                status: AttendanceStatus::Attending,
            },
        )
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    let for_event = services.attendance.get_for_event(&org.id, &event.id).await.unwrap();
    assert_eq!(for_event.len(), 1);
    assert_eq!(for_event[0].status, AttendanceStatus::Attending);

    let unknown_event = services
        .attendance
        .record(
            &org.id,
            "no-event",
            RecordAttendance {
                member_id: member.id.clone(),
                status: AttendanceStatus::Absent,
            },
        )
        .await;
    assert!(matches!(unknown_event, Err(ref e) if e.is_not_found()));

    let unknown_member = services
        .attendance
        .record(
            &org.id,
            &event.id,
            RecordAttendance {
                member_id: "ghost".to_string(),
                status: AttendanceStatus::Absent,
            },
        )
        .await;
    assert!(matches!(unknown_member, Err(Error::Validation(_))));

    services.attendance.delete(&org.id, &first.id).await.unwrap();
    assert!(services.attendance.get_all(&org.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_summary_counts_and_group_order() {
    let services = services();
    let org = services.organizations.create(org_input("Orchestra")).await.unwrap();
    let winds = services.groups.create(&org.id, group_input("Winds", 2)).await.unwrap();
    let strings = services.groups.create(&org.id, group_input("Strings", 1)).await.unwrap();

    let mut string_members = Vec::new();
    for name in ["Abe", "Baba", "Chiba"] {
        string_members.push(
            services
                .members
                .create(&org.id, member_input(&strings.id, name))
                .await
                .unwrap(),
        );
    }
    let flute = services
        .members
        .create(&org.id, member_input(&winds.id, "Doi"))
        .await
        .unwrap();

    let event = services.event_dates.create(&org.id, event_input(7)).await.unwrap();
    let answers = [
        (&string_members[0].id, AttendanceStatus::Attending),
        (&string_members[1].id, AttendanceStatus::Absent),
        (&flute.id, AttendanceStatus::Tentative),
    ];
    for (member_id, status) in answers {
        services
            .attendance
            .record(
                &org.id,
                &event.id,
                RecordAttendance {
                    member_id: member_id.clone(),
                    status,
                },
            )
            .await
            .unwrap();
    }

    let summary = services.attendance.summarize(&org.id, &event.id).await.unwrap();
    assert_eq!(summary.event_date, event);

    let names: Vec<_> = summary.groups.iter().map(|g| g.group_name.as_str()).collect();
    assert_eq!(names, vec!["Strings", "Winds"]);

    let strings_summary = &summary.groups[0];
    assert_eq!(strings_summary.counts.attending, 1);
    assert_eq!(strings_summary.counts.absent, 1);
    assert_eq!(strings_summary.counts.unanswered, 1);
    assert_eq!(strings_summary.counts.responded, 2);
    assert_eq!(strings_summary.members[2].status, None);

    assert_eq!(summary.groups[1].counts.tentative, 1);
    assert_eq!(summary.totals.responded, 3);
    assert_eq!(summary.totals.unanswered, 1);

    let missing = services.attendance.summarize(&org.id, "nope").await;
    assert!(matches!(missing, Err(ref e) if e.is_not_found()));
}
