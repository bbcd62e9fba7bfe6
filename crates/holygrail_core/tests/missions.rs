use holygrail_core::db::open_db_in_memory;
use holygrail_core::{
    FixedClock, Grail, GrailError, LookupKey, NewMission, NewQuest, WaitForError, DAY_MS,
};
use rusqlite::Connection;
use std::sync::Arc;
use uuid::Uuid;

const NOW: i64 = 1_700_000_000_000;

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

fn grail_at(conn: &Connection, now: i64) -> (Grail<'_>, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::new(now));
    let grail = Grail::with_clock(conn, clock.clone()).unwrap();
    (grail, clock)
}

#[test]
fn new_mission_lands_in_default_realm() {
    let conn = setup();
    let (grail, _) = grail_at(&conn, NOW);
    let default = grail.realms().default_realm().unwrap();

    let mission = grail
        .missions()
        .add_mission(NewMission::new("buy milk"))
        .unwrap();

    assert_eq!(mission.realm, default.uuid);
    assert_eq!(mission.created_at, NOW);
    assert!(!mission.completed);
    assert_eq!(mission.completed_at, None);
}

#[test]
fn quest_default_realm_is_used_when_no_realm_is_given() {
    let conn = setup();
    let (grail, _) = grail_at(&conn, NOW);
    let work = grail.realms().add_realm("work", false, false).unwrap();
    let home = grail.realms().add_realm("home", false, false).unwrap();
    let mut quest_request = NewQuest::new("ship release");
    quest_request.default_realm = Some(work.uuid);
    let quest = grail.quests().add_quest(quest_request).unwrap();

    let mut request = NewMission::new("write notes");
    request.quest = Some(quest.uuid);
    let inherited = grail.missions().add_mission(request.clone()).unwrap();
    assert_eq!(inherited.realm, work.uuid);

    request.realm = Some(home.uuid);
    let explicit = grail.missions().add_mission(request).unwrap();
    assert_eq!(explicit.realm, home.uuid);
}

#[test]
fn unknown_realm_or_quest_is_reported() {
    let conn = setup();
    let (grail, _) = grail_at(&conn, NOW);
    let missing = Uuid::new_v4();

    let mut request = NewMission::new("lost");
    request.realm = Some(missing);
    let err = grail.missions().add_mission(request).unwrap_err();
    assert!(matches!(err, GrailError::RealmNotFound(LookupKey::Id(id)) if id == missing));

    let mut request = NewMission::new("lost");
    request.quest = Some(missing);
    let err = grail.missions().add_mission(request).unwrap_err();
    assert!(matches!(err, GrailError::QuestNotFound(LookupKey::Id(id)) if id == missing));

    let err = grail.missions().get_mission(missing).unwrap_err();
    assert!(matches!(err, GrailError::MissionNotFound(_)));
}

#[test]
fn unique_add_rejects_open_duplicate_only() {
    let conn = setup();
    let (grail, _) = grail_at(&conn, NOW);
    let missions = grail.missions();
    let first = missions.add_mission(NewMission::new("water plants")).unwrap();

    let mut request = NewMission::new("water plants");
    request.unique = true;
    let err = missions.add_mission(request.clone()).unwrap_err();
    assert!(matches!(err, GrailError::DuplicateMission(ref text) if text == "water plants"));

    missions.toggle(first.uuid).unwrap();
    missions.add_mission(request).unwrap();

    // Without the flag duplicates are allowed.
    missions.add_mission(NewMission::new("water plants")).unwrap();
    assert_eq!(missions.get_mission_by_desc("water plants").unwrap().len(), 3);
}

#[test]
fn toggle_stamps_and_clears_completion_time() {
    let conn = setup();
    let (grail, clock) = grail_at(&conn, NOW);
    let mission = grail.missions().add_mission(NewMission::new("call")).unwrap();

    clock.advance(DAY_MS);
    let done = grail.missions().toggle(mission.uuid).unwrap();
    assert!(done.completed);
    assert_eq!(done.completed_at, Some(NOW + DAY_MS));

    let reopened = grail.missions().toggle(mission.uuid).unwrap();
    assert!(!reopened.completed);
    assert_eq!(reopened.completed_at, None);

    let stored = grail.missions().get_mission(mission.uuid).unwrap();
    assert_eq!(stored, reopened);
}

#[test]
fn set_completed_twice_keeps_first_stamp() {
    let conn = setup();
    let (grail, clock) = grail_at(&conn, NOW);
    let mission = grail.missions().add_mission(NewMission::new("call")).unwrap();

    let once = grail.missions().set_completed(mission.uuid, true).unwrap();
    clock.advance(1_000);
    let twice = grail.missions().set_completed(mission.uuid, true).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn wait_for_rejects_self_and_direct_cycle() {
    let conn = setup();
    let (grail, _) = grail_at(&conn, NOW);
    let missions = grail.missions();
    let a = missions.add_mission(NewMission::new("a")).unwrap();
    let b = missions.add_mission(NewMission::new("b")).unwrap();

    let err = missions.wait_for(a.uuid, a.uuid).unwrap_err();
    assert!(matches!(err, GrailError::WaitFor(WaitForError::SelfWait(_))));
    assert_eq!(err.to_string(), "can't wait for self");

    missions.wait_for(b.uuid, a.uuid).unwrap();
    let err = missions.wait_for(a.uuid, b.uuid).unwrap_err();
    assert!(matches!(err, GrailError::WaitFor(WaitForError::MutualWait { .. })));
    assert_eq!(err.to_string(), "can't wait for a mission that is waiting for me");

    assert_eq!(missions.get_mission(a.uuid).unwrap().previous_mission, None);
    assert_eq!(
        missions.get_mission(b.uuid).unwrap().previous_mission,
        Some(a.uuid)
    );
}

#[test]
fn longer_wait_cycles_are_accepted() {
    let conn = setup();
    let (grail, _) = grail_at(&conn, NOW);
    let missions = grail.missions();
    let a = missions.add_mission(NewMission::new("a")).unwrap();
    let b = missions.add_mission(NewMission::new("b")).unwrap();
    let c = missions.add_mission(NewMission::new("c")).unwrap();

    missions.wait_for(a.uuid, b.uuid).unwrap();
    missions.wait_for(b.uuid, c.uuid).unwrap();
    let closed = missions.wait_for(c.uuid, a.uuid).unwrap();
    assert_eq!(closed.previous_mission, Some(a.uuid));
}

#[test]
fn wait_for_at_creation() {
    let conn = setup();
    let (grail, _) = grail_at(&conn, NOW);
    let missions = grail.missions();
    let first = missions.add_mission(NewMission::new("first")).unwrap();

    let mut request = NewMission::new("second");
    request.wait_for = Some(first.uuid);
    let second = missions.add_mission(request).unwrap();
    assert_eq!(second.previous_mission, Some(first.uuid));

    let stopped = missions.stop_waiting(second.uuid).unwrap();
    assert_eq!(stopped.previous_mission, None);
}

#[test]
fn removing_a_mission_frees_its_dependents() {
    let conn = setup();
    let (grail, _) = grail_at(&conn, NOW);
    let missions = grail.missions();
    let blocker = missions.add_mission(NewMission::new("blocker")).unwrap();
    let waiting = missions.add_mission(NewMission::new("waiting")).unwrap();
    missions.wait_for(waiting.uuid, blocker.uuid).unwrap();
    missions.add_tag(blocker.uuid, "errand").unwrap();

    missions.remove_mission(blocker.uuid).unwrap();

    let freed = missions.get_mission(waiting.uuid).unwrap();
    assert_eq!(freed.previous_mission, None);
    assert!(matches!(
        missions.get_mission(blocker.uuid),
        Err(GrailError::MissionNotFound(_))
    ));
    assert!(grail.views().missions_with_tag("errand").unwrap().is_empty());
    assert_eq!(
        grail.views().list_missions(false).unwrap()[0].uuid,
        waiting.uuid
    );
}

#[test]
fn tags_are_trimmed_unique_and_ordered() {
    let conn = setup();
    let (grail, _) = grail_at(&conn, NOW);
    let missions = grail.missions();
    let mission = missions.add_mission(NewMission::new("groceries")).unwrap();

    missions.add_tag(mission.uuid, " shop ").unwrap();
    missions.add_tag(mission.uuid, "food").unwrap();
    missions.add_tag(mission.uuid, "shop").unwrap();

    assert_eq!(grail.views().tags_for(mission.uuid).unwrap(), ["shop", "food"]);

    let err = missions.add_tag(mission.uuid, "  ").unwrap_err();
    assert!(matches!(err, GrailError::InvalidDescription));

    missions.remove_tag(mission.uuid, "shop").unwrap();
    let err = missions.remove_tag(mission.uuid, "shop").unwrap_err();
    assert!(matches!(err, GrailError::TagNotFound { ref tag, .. } if tag == "shop"));
    assert_eq!(err.to_string(), "tag `shop` doesn't exist");
    assert_eq!(grail.views().tags_for(mission.uuid).unwrap(), ["food"]);
}

#[test]
fn missions_with_tag_follow_creation_order() {
    let conn = setup();
    let (grail, _) = grail_at(&conn, NOW);
    let missions = grail.missions();
    let first = missions.add_mission(NewMission::new("first")).unwrap();
    let second = missions.add_mission(NewMission::new("second")).unwrap();
    let _untagged = missions.add_mission(NewMission::new("third")).unwrap();

    missions.add_tag(second.uuid, "urgent").unwrap();
    missions.add_tag(first.uuid, "urgent").unwrap();

    let tagged: Vec<Uuid> = grail
        .views()
        .missions_with_tag("urgent")
        .unwrap()
        .into_iter()
        .map(|mission| mission.uuid)
        .collect();
    assert_eq!(tagged, vec![first.uuid, second.uuid]);
}

#[test]
fn change_realm_and_quest() {
    let conn = setup();
    let (grail, _) = grail_at(&conn, NOW);
    let work = grail.realms().add_realm("work", false, false).unwrap();
    let quest = grail.quests().add_quest(NewQuest::new("launch")).unwrap();
    let mission = grail.missions().add_mission(NewMission::new("deploy")).unwrap();

    let moved = grail.missions().change_realm(mission.uuid, work.uuid).unwrap();
    assert_eq!(moved.realm, work.uuid);
    let err = grail
        .missions()
        .change_realm(mission.uuid, Uuid::new_v4())
        .unwrap_err();
    assert!(matches!(err, GrailError::RealmNotFound(_)));

    let joined = grail
        .missions()
        .change_quest(mission.uuid, Some(quest.uuid))
        .unwrap();
    assert_eq!(joined.quest, Some(quest.uuid));
    let left = grail.missions().change_quest(mission.uuid, None).unwrap();
    assert_eq!(left.quest, None);
}

#[test]
fn effective_due_is_capped_by_quest_due() {
    let conn = setup();
    let (grail, _) = grail_at(&conn, NOW);
    let mut quest_request = NewQuest::new("trip");
    quest_request.due = Some(NOW + 10 * DAY_MS);
    let quest = grail.quests().add_quest(quest_request).unwrap();

    let mut request = NewMission::new("passport");
    request.quest = Some(quest.uuid);
    let mission = grail.missions().add_mission(request).unwrap();
    assert_eq!(
        grail.missions().effective_due(mission.uuid).unwrap(),
        Some(NOW + 10 * DAY_MS)
    );

    grail
        .missions()
        .due_for(mission.uuid, Some(NOW + 5 * DAY_MS))
        .unwrap();
    assert_eq!(
        grail.missions().effective_due(mission.uuid).unwrap(),
        Some(NOW + 5 * DAY_MS)
    );

    grail
        .missions()
        .due_for(mission.uuid, Some(NOW + 20 * DAY_MS))
        .unwrap();
    assert_eq!(
        grail.missions().effective_due(mission.uuid).unwrap(),
        Some(NOW + 10 * DAY_MS)
    );
}

#[test]
fn rename_and_tickle_round_trip() {
    let conn = setup();
    let (grail, _) = grail_at(&conn, NOW);
    let mission = grail.missions().add_mission(NewMission::new("draft")).unwrap();

    let once = grail.missions().rename_mission(mission.uuid, "final").unwrap();
    let twice = grail.missions().rename_mission(mission.uuid, "final").unwrap();
    assert_eq!(once, twice);

    let tickled = grail
        .missions()
        .tickle(mission.uuid, Some(NOW + DAY_MS))
        .unwrap();
    assert_eq!(tickled.tickler, Some(NOW + DAY_MS));
    assert_eq!(grail.missions().get_mission(mission.uuid).unwrap(), tickled);
}
