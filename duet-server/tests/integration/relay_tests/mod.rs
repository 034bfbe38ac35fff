mod test_disconnect_leaves_room;
mod test_relay_requires_shared_room;
mod test_room_full;
